//! Canned questions served when live generation is unavailable.

use crate::generation::draft::DraftQuestion;
use crate::model::InputType;

/// The fallback bank, in serving order. Each entry is a complete draft so it
/// can be relayed through the same streaming path as a generated question.
pub fn fallback_bank() -> Vec<DraftQuestion> {
    vec![
        DraftQuestion {
            title: Some("Budget Range".into()),
            description: Some(
                "What's your estimated budget range for this project? This helps us recommend the right approach and timeline."
                    .into(),
            ),
            input_type: Some(InputType::Dropdown),
            options: Some(
                ["Under $5k", "$5k - $15k", "$15k - $30k", "$30k - $75k", "$75k+", "Let's discuss"]
                    .map(String::from)
                    .to_vec(),
            ),
            ..Default::default()
        },
        DraftQuestion {
            title: Some("Company Information".into()),
            description: Some(
                "Tell us about your company or organization. What industry are you in and what's your company size?"
                    .into(),
            ),
            input_type: Some(InputType::LongText),
            suggested_answers: Some(
                [
                    "We're a 50-person marketing agency specializing in B2B SaaS companies",
                    "Small e-commerce business selling handmade jewelry with 5 employees",
                    "Healthcare startup developing patient management solutions",
                ]
                .map(String::from)
                .to_vec(),
            ),
            ..Default::default()
        },
        DraftQuestion {
            title: Some("Current Website".into()),
            description: Some("Do you have an existing website or system we should know about?".into()),
            input_type: Some(InputType::Url),
            ..Default::default()
        },
        DraftQuestion {
            title: Some("Success Metrics".into()),
            description: Some(
                "How will you measure the success of this project? What are your key goals?".into(),
            ),
            input_type: Some(InputType::LongText),
            suggested_answers: Some(
                [
                    "Reduce manual work by 80% and save 10 hours per week for our team",
                    "Increase customer satisfaction scores and reduce support tickets by 50%",
                    "Generate $50k in additional revenue within 6 months of launch",
                ]
                .map(String::from)
                .to_vec(),
            ),
            ..Default::default()
        },
        DraftQuestion {
            title: Some("Technical Requirements".into()),
            description: Some(
                "Do you have any specific technical requirements, integrations, or constraints we should consider?"
                    .into(),
            ),
            input_type: Some(InputType::LongText),
            suggested_answers: Some(
                [
                    "Must integrate with our existing Salesforce CRM and Stripe payments",
                    "Need mobile-responsive design and work on tablets for field staff",
                    "Requires HIPAA compliance and secure data handling for patient information",
                ]
                .map(String::from)
                .to_vec(),
            ),
            ..Default::default()
        },
    ]
}

/// Pick the fallback for the session's position, or `None` when the budget is
/// nearly spent and the session should complete instead.
pub fn select_fallback(ai_generated: usize, max_ai_questions: usize) -> Option<DraftQuestion> {
    if ai_generated >= max_ai_questions.saturating_sub(1) {
        return None;
    }
    let bank = fallback_bank();
    let index = ai_generated.min(bank.len() - 1);
    bank.into_iter().nth(index)
}
