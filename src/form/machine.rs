//! The discovery step machine.
//!
//! Every UI action and every async outcome is funneled through
//! [`FormSession::apply`] as a [`StepEvent`]. The session mutates itself and
//! answers with the [`Effect`] the caller must run next (ask for a question,
//! submit, or nothing). Validation failures leave the session untouched so the
//! caller can surface the message and let the user fix their answer.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::form::validate::validate_answer;
use crate::model::{fixed_questions, AnswerValue, Question, ResponseEntry};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Waiting for the answer to `questions[step]`.
    Answering { step: usize },
    /// A follow-up question is being generated.
    GeneratingNext,
    /// Responses are being delivered.
    Submitting,
    /// Terminal. `success` records how delivery ended.
    Complete { success: bool },
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Answering { step } => write!(f, "answering:{}", step),
            Self::GeneratingNext => write!(f, "generating_next"),
            Self::Submitting => write!(f, "submitting"),
            Self::Complete { success: true } => write!(f, "complete:success"),
            Self::Complete { success: false } => write!(f, "complete:error"),
        }
    }
}

/// Where submission stands, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    /// Submission started (or is about to); outcome unknown.
    #[default]
    Pending,
    /// Delivered and acknowledged.
    Success,
    /// Delivery failed; the user may retry.
    Error,
    /// No submission in flight.
    Idle,
}

/// Everything that can happen to a session.
#[derive(Debug, Clone)]
pub enum StepEvent {
    /// The user answered the current question.
    Answer(AnswerValue),
    /// The user stepped back to the previous question.
    Back,
    /// Generation produced a renderable follow-up.
    QuestionReady(Question),
    /// Generation finished without a question (model judged the interview done).
    GenerationComplete,
    /// Generation failed outright.
    GenerationFailed,
    /// The submit round trip succeeded.
    DeliverySucceeded { submission_id: String, message: String },
    /// The submit round trip failed. The server still mints an ID for
    /// rejected submissions, so one may be attached.
    DeliveryFailed {
        submission_id: Option<String>,
        message: String,
    },
    /// The user asked to retry a failed submission.
    RetrySubmission,
}

/// What the caller must do after an event is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing — render the new state.
    None,
    /// Ask the generation client for the next question.
    RequestQuestion,
    /// Deliver the recorded responses.
    SubmitResponses,
}

/// One client-intake session: fixed questions, generated follow-ups, answers.
#[derive(Debug, Clone)]
pub struct FormSession {
    questions: Vec<Question>,
    responses: Vec<ResponseEntry>,
    state: StepState,
    ai_generated: usize,
    max_ai_questions: usize,
    fixed_count: usize,
    restored_answer: Option<AnswerValue>,
    submission_status: SubmissionStatus,
    submission_id: Option<String>,
    submission_message: Option<String>,
}

impl FormSession {
    /// Start a session on the standard fixed questions.
    pub fn new(max_ai_questions: usize) -> Self {
        Self::with_questions(fixed_questions(), max_ai_questions)
    }

    /// Start a session on a custom question list.
    pub fn with_questions(questions: Vec<Question>, max_ai_questions: usize) -> Self {
        let fixed_count = questions.len();
        Self {
            questions,
            responses: Vec::new(),
            state: StepState::Answering { step: 0 },
            ai_generated: 0,
            max_ai_questions,
            fixed_count,
            restored_answer: None,
            submission_status: SubmissionStatus::Pending,
            submission_id: None,
            submission_message: None,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn responses(&self) -> &[ResponseEntry] {
        &self.responses
    }

    pub fn ai_generated(&self) -> usize {
        self.ai_generated
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.submission_status
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    pub fn submission_message(&self) -> Option<&str> {
        self.submission_message.as_deref()
    }

    /// The question awaiting an answer, if the session is on one.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            StepState::Answering { step } => self.questions.get(step),
            _ => None,
        }
    }

    /// Answer put back by a `Back` event, for pre-filling the input. Consumed.
    pub fn take_restored_answer(&mut self) -> Option<AnswerValue> {
        self.restored_answer.take()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, StepState::Complete { .. })
    }

    /// Progress through the form, 0–100. While follow-ups may still arrive the
    /// denominator counts one unseen question, and it never drops below the
    /// fixed prefix plus one, so short sessions top out below 100.
    pub fn progress_percent(&self) -> f64 {
        let step = match self.state {
            StepState::Answering { step } => step,
            _ => self.responses.len().saturating_sub(1),
        };
        let settled = matches!(
            self.state,
            StepState::Submitting | StepState::Complete { .. }
        );
        let total = self.questions.len() + usize::from(!settled);
        let denominator = total.max(self.fixed_count + 1) as f64;
        (((step + 1) as f64 / denominator) * 100.0).min(100.0)
    }

    /// Responses as submitted: blank answers dropped, later duplicates of the
    /// same question dropped.
    pub fn submission_responses(&self) -> Vec<ResponseEntry> {
        let mut seen = HashSet::new();
        self.responses
            .iter()
            .filter(|entry| {
                let first_occurrence = seen.insert(entry.question.as_str());
                first_occurrence && !entry.answer.trim().is_empty()
            })
            .cloned()
            .collect()
    }

    // ── The reducer ─────────────────────────────────────────────────

    /// Apply one event. On `Err` the session is unchanged.
    pub fn apply(&mut self, event: StepEvent) -> Result<Effect, ValidationError> {
        match (self.state, event) {
            (StepState::Answering { step }, StepEvent::Answer(answer)) => {
                self.answer_current(step, answer)
            }
            (StepState::Answering { step }, StepEvent::Back) => {
                self.step_back(step);
                Ok(Effect::None)
            }
            (StepState::GeneratingNext, StepEvent::QuestionReady(question)) => {
                if self.is_duplicate(&question) {
                    // A repeat question means the model has run out of new
                    // ground; close the interview rather than ask it again.
                    Ok(self.begin_submission())
                } else {
                    self.questions.push(question);
                    self.ai_generated += 1;
                    self.state = StepState::Answering {
                        step: self.responses.len(),
                    };
                    Ok(Effect::None)
                }
            }
            (StepState::GeneratingNext, StepEvent::GenerationComplete)
            | (StepState::GeneratingNext, StepEvent::GenerationFailed) => {
                Ok(self.begin_submission())
            }
            (
                StepState::Submitting,
                StepEvent::DeliverySucceeded {
                    submission_id,
                    message,
                },
            ) => {
                self.state = StepState::Complete { success: true };
                self.submission_status = SubmissionStatus::Success;
                self.submission_id = Some(submission_id);
                self.submission_message = Some(message);
                Ok(Effect::None)
            }
            (
                StepState::Submitting,
                StepEvent::DeliveryFailed {
                    submission_id,
                    message,
                },
            ) => {
                self.state = StepState::Complete { success: false };
                self.submission_status = SubmissionStatus::Error;
                if submission_id.is_some() {
                    self.submission_id = submission_id;
                }
                self.submission_message = Some(message);
                Ok(Effect::None)
            }
            (StepState::Complete { success: false }, StepEvent::RetrySubmission) => {
                Ok(self.begin_submission())
            }
            // Anything else (answers while submitting, retries mid-flight,
            // stray generation events) is dropped without touching the session.
            (state, event) => {
                tracing::debug!(state = %state, ?event, "Ignoring event in current state");
                Ok(Effect::None)
            }
        }
    }

    fn answer_current(
        &mut self,
        step: usize,
        answer: AnswerValue,
    ) -> Result<Effect, ValidationError> {
        let Some(question) = self.questions.get(step) else {
            return Ok(Effect::None);
        };
        validate_answer(question, &answer)?;

        self.responses
            .push(ResponseEntry::new(question.prompt_text.clone(), answer.encode()));
        self.restored_answer = None;

        if step + 1 < self.questions.len() {
            self.state = StepState::Answering { step: step + 1 };
            Ok(Effect::None)
        } else if self.ai_generated < self.max_ai_questions {
            self.state = StepState::GeneratingNext;
            Ok(Effect::RequestQuestion)
        } else {
            Ok(self.begin_submission())
        }
    }

    fn step_back(&mut self, step: usize) {
        if step == 0 {
            return;
        }
        self.restored_answer = self.responses.pop().map(|previous| {
            let input_type = self.questions[step - 1].input_type;
            AnswerValue::decode(input_type, &previous.answer)
        });
        self.state = StepState::Answering { step: step - 1 };
    }

    fn begin_submission(&mut self) -> Effect {
        self.state = StepState::Submitting;
        self.submission_status = SubmissionStatus::Pending;
        Effect::SubmitResponses
    }

    fn is_duplicate(&self, question: &Question) -> bool {
        self.questions
            .iter()
            .any(|existing| existing.title == question.title || existing.prompt_text == question.prompt_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InputType;

    fn contact() -> AnswerValue {
        AnswerValue::Contact {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
        }
    }

    fn ai_question(n: usize) -> Question {
        Question::new(
            format!("ai_{}", n),
            format!("Follow-up {}", n),
            "Tell us more.",
            format!("Follow-up {}", n),
            InputType::Text,
        )
    }

    /// Answer the four fixed questions; returns the effect of the last one.
    fn answer_fixed_prefix(session: &mut FormSession) -> Effect {
        session.apply(StepEvent::Answer(contact())).unwrap();
        session
            .apply(StepEvent::Answer("Web Application".into()))
            .unwrap();
        session
            .apply(StepEvent::Answer("A portal for our customers to track orders.".into()))
            .unwrap();
        session.apply(StepEvent::Answer("1 month".into())).unwrap()
    }

    #[test]
    fn starts_on_first_fixed_question() {
        let session = FormSession::new(8);
        assert_eq!(session.state(), StepState::Answering { step: 0 });
        assert_eq!(session.current_question().unwrap().id, "contact_info");
        assert_eq!(session.progress_percent(), 20.0);
    }

    #[test]
    fn answers_advance_through_fixed_prefix() {
        let mut session = FormSession::new(8);
        assert_eq!(
            session.apply(StepEvent::Answer(contact())).unwrap(),
            Effect::None
        );
        assert_eq!(session.state(), StepState::Answering { step: 1 });
        assert_eq!(session.responses().len(), 1);
        assert_eq!(session.responses()[0].question, "What's your name and email?");
        assert_eq!(session.responses()[0].answer, "Jane Doe|jane@example.com");
    }

    #[test]
    fn rejected_answer_leaves_session_unchanged() {
        let mut session = FormSession::new(8);
        let err = session
            .apply(StepEvent::Answer(AnswerValue::Text(String::new())))
            .unwrap_err();
        assert_eq!(err, ValidationError::NameRequired);
        assert_eq!(session.state(), StepState::Answering { step: 0 });
        assert!(session.responses().is_empty());
    }

    #[test]
    fn last_fixed_answer_requests_generation() {
        let mut session = FormSession::new(8);
        let effect = answer_fixed_prefix(&mut session);
        assert_eq!(effect, Effect::RequestQuestion);
        assert_eq!(session.state(), StepState::GeneratingNext);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn ready_question_is_appended_and_presented() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        let effect = session
            .apply(StepEvent::QuestionReady(ai_question(1)))
            .unwrap();
        assert_eq!(effect, Effect::None);
        assert_eq!(session.state(), StepState::Answering { step: 4 });
        assert_eq!(session.questions().len(), 5);
        assert_eq!(session.ai_generated(), 1);
        assert_eq!(session.current_question().unwrap().id, "ai_1");
    }

    #[test]
    fn generation_complete_moves_to_submission() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        let effect = session.apply(StepEvent::GenerationComplete).unwrap();
        assert_eq!(effect, Effect::SubmitResponses);
        assert_eq!(session.state(), StepState::Submitting);
        assert_eq!(session.submission_status(), SubmissionStatus::Pending);
    }

    #[test]
    fn generation_failure_also_moves_to_submission() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        assert_eq!(
            session.apply(StepEvent::GenerationFailed).unwrap(),
            Effect::SubmitResponses
        );
        assert_eq!(session.state(), StepState::Submitting);
    }

    #[test]
    fn duplicate_question_forces_submission() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);

        // Same title as the fixed "Project Type" question.
        let duplicate = Question::new(
            "ai_1",
            "Project Type",
            "Different description.",
            "Something new?",
            InputType::Text,
        );
        let effect = session.apply(StepEvent::QuestionReady(duplicate)).unwrap();
        assert_eq!(effect, Effect::SubmitResponses);
        assert_eq!(session.state(), StepState::Submitting);
        assert_eq!(session.questions().len(), 4);
        assert_eq!(session.ai_generated(), 0);
    }

    #[test]
    fn duplicate_by_prompt_text_also_forces_submission() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);

        let duplicate = Question::new(
            "ai_1",
            "Fresh Title",
            "Description.",
            "What's your name and email?",
            InputType::Text,
        );
        assert_eq!(
            session.apply(StepEvent::QuestionReady(duplicate)).unwrap(),
            Effect::SubmitResponses
        );
    }

    #[test]
    fn budget_exhaustion_submits_without_another_request() {
        let mut session = FormSession::new(8);
        let mut effect = answer_fixed_prefix(&mut session);
        let mut served = 0;
        while effect == Effect::RequestQuestion {
            served += 1;
            session
                .apply(StepEvent::QuestionReady(ai_question(served)))
                .unwrap();
            effect = session
                .apply(StepEvent::Answer(AnswerValue::Text(format!("answer {}", served))))
                .unwrap();
        }
        assert_eq!(effect, Effect::SubmitResponses);
        assert_eq!(served, 8);
        assert_eq!(session.ai_generated(), 8);
        assert_eq!(session.questions().len(), 12);
        assert_eq!(session.responses().len(), 12);
    }

    #[test]
    fn seventh_follow_up_still_leaves_room_for_one_more() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        for n in 1..=7 {
            session
                .apply(StepEvent::QuestionReady(ai_question(n)))
                .unwrap();
            let effect = session
                .apply(StepEvent::Answer("answer".into()))
                .unwrap();
            assert_eq!(effect, Effect::RequestQuestion, "after follow-up {}", n);
        }
        assert_eq!(session.ai_generated(), 7);
        assert_eq!(session.state(), StepState::GeneratingNext);
    }

    #[test]
    fn back_restores_previous_answer() {
        let mut session = FormSession::new(8);
        session.apply(StepEvent::Answer(contact())).unwrap();
        assert_eq!(session.state(), StepState::Answering { step: 1 });

        session.apply(StepEvent::Back).unwrap();
        assert_eq!(session.state(), StepState::Answering { step: 0 });
        assert!(session.responses().is_empty());
        assert_eq!(session.take_restored_answer(), Some(contact()));
        // Consumed on read.
        assert_eq!(session.take_restored_answer(), None);
    }

    #[test]
    fn back_at_first_question_is_a_noop() {
        let mut session = FormSession::new(8);
        session.apply(StepEvent::Back).unwrap();
        assert_eq!(session.state(), StepState::Answering { step: 0 });
    }

    #[test]
    fn back_decodes_structured_answers() {
        let multiselect = Question::new("q0", "Integrations", "Pick some.", "Which integrations?", InputType::Multiselect)
            .with_options(&["Stripe", "Salesforce", "Slack"]);
        let text = Question::new("q1", "Name", "Your name.", "What's your name?", InputType::Text);
        let mut session = FormSession::with_questions(vec![multiselect, text], 0);

        let picked = AnswerValue::Selections(vec!["Stripe".into(), "Slack".into()]);
        session.apply(StepEvent::Answer(picked.clone())).unwrap();
        session.apply(StepEvent::Back).unwrap();
        assert_eq!(session.take_restored_answer(), Some(picked));
    }

    #[test]
    fn answer_after_back_replaces_popped_response() {
        let mut session = FormSession::new(8);
        session.apply(StepEvent::Answer(contact())).unwrap();
        session
            .apply(StepEvent::Answer("Web Application".into()))
            .unwrap();
        session.apply(StepEvent::Back).unwrap();
        session
            .apply(StepEvent::Answer("SaaS Platform".into()))
            .unwrap();

        assert_eq!(session.responses().len(), 2);
        assert_eq!(session.responses()[1].answer, "SaaS Platform");
        // Responses still align one-to-one with answered questions.
        assert_eq!(session.state(), StepState::Answering { step: 2 });
    }

    #[test]
    fn delivery_success_completes_the_session() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        session.apply(StepEvent::GenerationComplete).unwrap();
        session
            .apply(StepEvent::DeliverySucceeded {
                submission_id: "sub_1700000000000_abc123xyz".into(),
                message: "Form submitted successfully".into(),
            })
            .unwrap();

        assert_eq!(session.state(), StepState::Complete { success: true });
        assert_eq!(session.submission_status(), SubmissionStatus::Success);
        assert_eq!(session.submission_id(), Some("sub_1700000000000_abc123xyz"));
        assert!(session.is_complete());
        // With no follow-ups the denominator keeps its fixed-prefix floor.
        assert_eq!(session.progress_percent(), 80.0);
    }

    #[test]
    fn delivery_failure_allows_retry() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        session.apply(StepEvent::GenerationFailed).unwrap();
        session
            .apply(StepEvent::DeliveryFailed {
                submission_id: Some("sub_2_b".into()),
                message: "Network error. Please check your connection and try again.".into(),
            })
            .unwrap();
        assert_eq!(session.state(), StepState::Complete { success: false });
        assert_eq!(session.submission_status(), SubmissionStatus::Error);
        assert_eq!(session.submission_id(), Some("sub_2_b"));

        let effect = session.apply(StepEvent::RetrySubmission).unwrap();
        assert_eq!(effect, Effect::SubmitResponses);
        assert_eq!(session.state(), StepState::Submitting);
        assert_eq!(session.submission_status(), SubmissionStatus::Pending);
    }

    #[test]
    fn stray_events_are_ignored() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        session.apply(StepEvent::GenerationComplete).unwrap();
        assert_eq!(session.state(), StepState::Submitting);

        // Answers, retries, and generation events do nothing mid-submission.
        assert_eq!(
            session.apply(StepEvent::Answer("late".into())).unwrap(),
            Effect::None
        );
        assert_eq!(session.apply(StepEvent::RetrySubmission).unwrap(), Effect::None);
        assert_eq!(
            session
                .apply(StepEvent::QuestionReady(ai_question(9)))
                .unwrap(),
            Effect::None
        );
        assert_eq!(session.state(), StepState::Submitting);

        session
            .apply(StepEvent::DeliverySucceeded {
                submission_id: "sub_1_a".into(),
                message: "ok".into(),
            })
            .unwrap();
        // Completed sessions ignore retries too.
        assert_eq!(session.apply(StepEvent::RetrySubmission).unwrap(), Effect::None);
        assert_eq!(session.state(), StepState::Complete { success: true });
    }

    #[test]
    fn submission_responses_drop_blanks_and_duplicates() {
        let mut session = FormSession::new(8);
        answer_fixed_prefix(&mut session);
        // Blank optional answer plus a duplicated question key.
        session.responses = vec![
            ResponseEntry::new("Q1", "a"),
            ResponseEntry::new("Q2", "   "),
            ResponseEntry::new("Q1", "b"),
            ResponseEntry::new("Q3", "c"),
        ];
        let filtered = session.submission_responses();
        assert_eq!(
            filtered,
            vec![ResponseEntry::new("Q1", "a"), ResponseEntry::new("Q3", "c")]
        );
    }

    #[test]
    fn progress_moves_with_the_session() {
        let mut session = FormSession::new(8);
        assert_eq!(session.progress_percent(), 20.0);

        session.apply(StepEvent::Answer(contact())).unwrap();
        assert_eq!(session.progress_percent(), 40.0);

        answer_fixed_prefix_rest(&mut session);
        // Generating: four answered, one unseen follow-up counted.
        assert_eq!(session.state(), StepState::GeneratingNext);
        assert_eq!(session.progress_percent(), 80.0);

        session
            .apply(StepEvent::QuestionReady(ai_question(1)))
            .unwrap();
        let on_fifth = session.progress_percent();
        assert!((on_fifth - 83.33).abs() < 0.01, "got {}", on_fifth);

        session.apply(StepEvent::Answer("done".into())).unwrap();
        session.apply(StepEvent::GenerationComplete).unwrap();
        assert_eq!(session.progress_percent(), 100.0);
    }

    /// Answer fixed questions 2–4 (the first is already answered).
    fn answer_fixed_prefix_rest(session: &mut FormSession) {
        session
            .apply(StepEvent::Answer("Web Application".into()))
            .unwrap();
        session
            .apply(StepEvent::Answer("A portal for our customers.".into()))
            .unwrap();
        session.apply(StepEvent::Answer("1 month".into())).unwrap();
    }

    #[test]
    fn zero_budget_session_submits_after_fixed_questions() {
        let mut session = FormSession::new(0);
        let effect = answer_fixed_prefix(&mut session);
        assert_eq!(effect, Effect::SubmitResponses);
        assert_eq!(session.state(), StepState::Submitting);
        assert_eq!(session.ai_generated(), 0);
    }

    #[test]
    fn state_display() {
        assert_eq!(StepState::Answering { step: 3 }.to_string(), "answering:3");
        assert_eq!(StepState::GeneratingNext.to_string(), "generating_next");
        assert_eq!(StepState::Complete { success: false }.to_string(), "complete:error");
    }
}
