//! Answer validation rules, applied before an answer is recorded.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::model::{AnswerValue, InputType, Question};

/// Character limit for short `text` answers.
pub const MAX_TEXT_LEN: usize = 100;
/// Character limit for `long_text` answers.
pub const MAX_LONG_TEXT_LEN: usize = 1000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Check an answer against a question's rules.
///
/// `Ok(())` means the answer may be recorded. `Err` carries the user-facing
/// message; the caller leaves the session untouched and surfaces it.
pub fn validate_answer(question: &Question, answer: &AnswerValue) -> Result<(), ValidationError> {
    // Multiselect is checked before the generic required rule so an empty
    // selection always reads as "pick something", not "field required".
    if question.input_type == InputType::Multiselect {
        let selected = match answer {
            AnswerValue::Selections(items) => items.len(),
            other => usize::from(!other.is_empty()),
        };
        if selected == 0 {
            return Err(ValidationError::NoSelection);
        }
    }

    let stored = answer.encode();

    if question.required && stored.trim().is_empty() {
        return Err(ValidationError::Required);
    }

    match question.input_type {
        InputType::Text if stored.chars().count() > MAX_TEXT_LEN => {
            Err(ValidationError::TooLong { max: MAX_TEXT_LEN })
        }
        InputType::LongText if stored.chars().count() > MAX_LONG_TEXT_LEN => {
            Err(ValidationError::TooLong {
                max: MAX_LONG_TEXT_LEN,
            })
        }
        InputType::Number if !stored.is_empty() && stored.trim().parse::<f64>().is_err() => {
            Err(ValidationError::NotANumber)
        }
        InputType::Contact => {
            let (name, email) = stored.split_once('|').unwrap_or((stored.as_str(), ""));
            if name.trim().is_empty() {
                Err(ValidationError::NameRequired)
            } else if email.trim().is_empty() {
                Err(ValidationError::EmailRequired)
            } else if !EMAIL_RE.is_match(email) {
                Err(ValidationError::InvalidEmail)
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(input_type: InputType, required: bool) -> Question {
        let q = Question::new("q", "Title", "Description.", "Prompt?", input_type);
        if required { q.required() } else { q }
    }

    #[test]
    fn required_empty_is_rejected() {
        let err = validate_answer(&question(InputType::Text, true), &AnswerValue::Text("  ".into()))
            .unwrap_err();
        assert_eq!(err, ValidationError::Required);
        assert_eq!(err.to_string(), "This field is required");
    }

    #[test]
    fn optional_empty_is_accepted() {
        let q = question(InputType::Dropdown, false);
        assert!(validate_answer(&q, &AnswerValue::Text(String::new())).is_ok());
    }

    #[test]
    fn text_length_limit() {
        let q = question(InputType::Text, false);
        let at_limit = AnswerValue::Text("x".repeat(MAX_TEXT_LEN));
        assert!(validate_answer(&q, &at_limit).is_ok());

        let over = AnswerValue::Text("x".repeat(MAX_TEXT_LEN + 1));
        let err = validate_answer(&q, &over).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { max: 100 });
        assert_eq!(err.to_string(), "Please keep your answer under 100 characters");
    }

    #[test]
    fn long_text_length_limit() {
        let q = question(InputType::LongText, false);
        assert!(validate_answer(&q, &AnswerValue::Text("x".repeat(1000))).is_ok());
        assert_eq!(
            validate_answer(&q, &AnswerValue::Text("x".repeat(1001))).unwrap_err(),
            ValidationError::TooLong { max: 1000 }
        );
    }

    #[test]
    fn number_must_parse() {
        let q = question(InputType::Number, false);
        assert!(validate_answer(&q, &AnswerValue::Text("42".into())).is_ok());
        assert!(validate_answer(&q, &AnswerValue::Text("3.14".into())).is_ok());
        assert!(validate_answer(&q, &AnswerValue::Text("1e3".into())).is_ok());
        // Empty is fine when the question isn't required.
        assert!(validate_answer(&q, &AnswerValue::Text(String::new())).is_ok());
        assert_eq!(
            validate_answer(&q, &AnswerValue::Text("about ten".into())).unwrap_err(),
            ValidationError::NotANumber
        );
    }

    #[test]
    fn contact_valid_pair_passes() {
        let q = question(InputType::Contact, true);
        let answer = AnswerValue::Contact {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
        };
        assert!(validate_answer(&q, &answer).is_ok());
    }

    #[test]
    fn contact_missing_name() {
        let q = question(InputType::Contact, true);
        let answer = AnswerValue::Contact {
            name: "  ".into(),
            email: "jane@example.com".into(),
        };
        let err = validate_answer(&q, &answer).unwrap_err();
        assert_eq!(err, ValidationError::NameRequired);
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn contact_missing_email() {
        let q = question(InputType::Contact, true);
        let answer = AnswerValue::Contact {
            name: "Jane Doe".into(),
            email: String::new(),
        };
        assert_eq!(
            validate_answer(&q, &answer).unwrap_err(),
            ValidationError::EmailRequired
        );
    }

    #[test]
    fn contact_malformed_email() {
        let q = question(InputType::Contact, true);
        for bad in ["not-an-email", "jane@nodot", "two words@example.com", "jane@@example.com"] {
            let answer = AnswerValue::Contact {
                name: "Jane Doe".into(),
                email: bad.into(),
            };
            let err = validate_answer(&q, &answer).unwrap_err();
            assert_eq!(err, ValidationError::InvalidEmail, "expected rejection for {bad:?}");
            assert_eq!(err.to_string(), "Please enter a valid email address");
        }
    }

    #[test]
    fn multiselect_needs_at_least_one() {
        let q = question(InputType::Multiselect, false);
        let err = validate_answer(&q, &AnswerValue::Selections(Vec::new())).unwrap_err();
        assert_eq!(err, ValidationError::NoSelection);
        assert_eq!(err.to_string(), "Please select at least one option");

        let one = AnswerValue::Selections(vec!["Stripe".into()]);
        assert!(validate_answer(&q, &one).is_ok());
    }

    #[test]
    fn required_multiselect_reports_selection_message() {
        // The selection message wins over the generic required message.
        let q = question(InputType::Multiselect, true);
        assert_eq!(
            validate_answer(&q, &AnswerValue::Selections(Vec::new())).unwrap_err(),
            ValidationError::NoSelection
        );
    }
}
