//! Form data model — questions, input types, and answer values.

use serde::{Deserialize, Serialize};

/// Which input widget a question renders with and how its answer is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Short free text (max 100 chars).
    Text,
    /// Paragraph answers (max 1000 chars).
    LongText,
    /// Binary yes/no choice.
    YesNo,
    /// Single choice from a fixed option list.
    Dropdown,
    /// Multiple choices from a fixed option list.
    Multiselect,
    /// Calendar date.
    Date,
    /// Numeric value.
    Number,
    /// Rating on a numeric scale.
    Rating,
    /// Email address.
    Email,
    /// Website URL.
    Url,
    /// Combined name + email pair.
    Contact,
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::LongText => write!(f, "long_text"),
            Self::YesNo => write!(f, "yes_no"),
            Self::Dropdown => write!(f, "dropdown"),
            Self::Multiselect => write!(f, "multiselect"),
            Self::Date => write!(f, "date"),
            Self::Number => write!(f, "number"),
            Self::Rating => write!(f, "rating"),
            Self::Email => write!(f, "email"),
            Self::Url => write!(f, "url"),
            Self::Contact => write!(f, "contact"),
        }
    }
}

impl std::str::FromStr for InputType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "long_text" => Ok(Self::LongText),
            "yes_no" => Ok(Self::YesNo),
            "dropdown" => Ok(Self::Dropdown),
            "multiselect" => Ok(Self::Multiselect),
            "date" => Ok(Self::Date),
            "number" => Ok(Self::Number),
            "rating" => Ok(Self::Rating),
            "email" => Ok(Self::Email),
            "url" => Ok(Self::Url),
            "contact" => Ok(Self::Contact),
            _ => Err(format!("Unknown input type: {}", s)),
        }
    }
}

/// Numeric scale bounds for `rating` questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: i64,
    pub max: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
}

/// A single form question — fixed or AI-generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Stable identifier (`contact_info`, `ai_3`, ...).
    pub id: String,
    /// Short heading shown above the input.
    pub title: String,
    /// One or two sentences of context under the title.
    pub description: String,
    /// Legacy full-sentence prompt. Also the join key between a question and
    /// its recorded response, so it must be unique within a session.
    #[serde(rename = "question")]
    pub prompt_text: String,
    /// Which input widget to render.
    pub input_type: InputType,
    /// Choices for dropdown/multiselect questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Example answers shown as one-click pills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_answers: Option<Vec<String>>,
    /// Whether an empty answer is rejected.
    #[serde(default)]
    pub required: bool,
    /// Scale bounds for rating questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<RatingScale>,
}

impl Question {
    /// Create a question with no options, suggestions, or scale.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        prompt_text: impl Into<String>,
        input_type: InputType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            prompt_text: prompt_text.into(),
            input_type,
            options: None,
            suggested_answers: None,
            required: false,
            scale: None,
        }
    }

    /// Set the option list.
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Set the suggested answers.
    pub fn with_suggested_answers(mut self, suggestions: &[&str]) -> Self {
        self.suggested_answers = Some(suggestions.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Mark the question as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// One recorded answer, keyed by the question's prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub question: String,
    pub answer: String,
}

impl ResponseEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A structured answer before it is flattened into the stored string form.
///
/// Storage is stringly typed (one `answer` string per question), so structured
/// answers are encoded on the way in and decoded again when the user steps back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// Free text, choice labels, dates, numbers — anything single-valued.
    Text(String),
    /// Multiselect choices, stored as a `", "`-joined list.
    Selections(Vec<String>),
    /// Contact pair, stored as `name|email`.
    Contact { name: String, email: String },
}

impl AnswerValue {
    /// Flatten into the stored string form.
    pub fn encode(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Selections(items) => items.join(", "),
            Self::Contact { name, email } => format!("{}|{}", name, email),
        }
    }

    /// Recover the structured form from a stored answer. Lossy for selections
    /// whose labels themselves contain `", "`, which the option banks avoid.
    pub fn decode(input_type: InputType, stored: &str) -> Self {
        match input_type {
            InputType::Multiselect => {
                if stored.is_empty() {
                    Self::Selections(Vec::new())
                } else {
                    Self::Selections(stored.split(", ").map(str::to_string).collect())
                }
            }
            InputType::Contact => {
                let (name, email) = stored.split_once('|').unwrap_or((stored, ""));
                Self::Contact {
                    name: name.to_string(),
                    email: email.to_string(),
                }
            }
            _ => Self::Text(stored.to_string()),
        }
    }

    /// Whether the encoded form is blank.
    pub fn is_empty(&self) -> bool {
        self.encode().trim().is_empty()
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// The four fixed questions every session starts with.
pub fn fixed_questions() -> Vec<Question> {
    vec![
        Question::new(
            "contact_info",
            "Ready to Start Your Next Project?",
            "Answer some quick questions about your project and then schedule a call with your project manager.",
            "What's your name and email?",
            InputType::Contact,
        )
        .required(),
        Question::new(
            "project_type",
            "Project Type",
            "Select the type of software solution you need to build.",
            "What type of software project are you looking to build?",
            InputType::Dropdown,
        )
        .with_options(&[
            "Web Application",
            "Mobile App (iOS/Android)",
            "E-commerce Store",
            "SaaS Platform",
            "API/Backend System",
            "Website/Landing Page",
            "Automation Tool",
            "Other",
        ])
        .required(),
        Question::new(
            "project_description",
            "Project Overview",
            "Describe your project requirements, target users, and key functionality needed.",
            "Describe your project in detail",
            InputType::LongText,
        )
        .with_suggested_answers(&[
            "We need a customer portal where clients can track orders, manage their accounts, and access support resources.",
            "Our team spends 3 hours daily on manual data entry that could be automated with a custom workflow system.",
            "We want to build a marketplace connecting freelancers with small businesses, similar to Upwork but for our niche industry.",
            "I'm looking to create an internal dashboard that consolidates data from multiple systems for better decision making.",
        ])
        .required(),
        Question::new(
            "deadline",
            "Project Timeline",
            "Specify your preferred project completion timeframe or deadline requirements.",
            "Do you have a deadline or launch date?",
            InputType::Dropdown,
        )
        .with_options(&[
            "ASAP (Rush job)",
            "1-2 weeks",
            "1 month",
            "2-3 months",
            "3-6 months",
            "6+ months",
            "No specific deadline",
        ]),
    ]
}
