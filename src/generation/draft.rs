//! Partially streamed question drafts.
//!
//! While a question is being generated, the model's JSON object arrives a few
//! fields at a time. `DraftQuestion` is that in-flight shape: every field
//! optional, merged frame by frame until the draft is ready to promote into a
//! real [`Question`].

use serde::Serialize;
use serde_json::Value;

use crate::model::{InputType, Question};

/// Cumulative view of a question mid-generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftQuestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_answers: Option<Vec<String>>,
    /// Set by the model when the interview should end instead of producing
    /// another question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

impl DraftQuestion {
    /// Extract whatever fields of `value` are usable right now.
    ///
    /// Field-by-field on purpose: a frame captured mid-token (say an
    /// `inputType` of `"long_t"`) must not poison the fields that did arrive
    /// whole, so anything that doesn't parse is simply left `None`.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            title: obj.get("title").and_then(Value::as_str).map(str::to_string),
            description: obj
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            input_type: obj
                .get("inputType")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
            options: obj.get("options").and_then(string_array),
            suggested_answers: obj.get("suggestedAnswers").and_then(string_array),
            complete: obj.get("complete").and_then(Value::as_bool),
        }
    }

    /// Fold a newer frame into this draft. Fields present in `incoming` win;
    /// absent fields keep whatever streamed in earlier.
    pub fn merge(&mut self, incoming: Self) {
        let prev = std::mem::take(self);
        *self = Self {
            title: incoming.title.or(prev.title),
            description: incoming.description.or(prev.description),
            input_type: incoming.input_type.or(prev.input_type),
            options: incoming.options.or(prev.options),
            suggested_answers: incoming.suggested_answers.or(prev.suggested_answers),
            complete: incoming.complete.or(prev.complete),
        };
    }

    /// Whether the draft carries everything a renderable question needs:
    /// non-empty title, non-empty description, and an input type.
    pub fn is_ready(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
            && self.description.as_deref().is_some_and(|d| !d.is_empty())
            && self.input_type.is_some()
    }

    /// Whether the model marked the interview as finished.
    pub fn signals_complete(&self) -> bool {
        self.complete.unwrap_or(false)
    }

    /// Promote a ready draft into a session question. Generated questions are
    /// never required, and the title doubles as the legacy prompt text.
    pub fn into_question(self, id: impl Into<String>) -> Option<Question> {
        if !self.is_ready() {
            return None;
        }
        let title = self.title?;
        let description = self.description?;
        let input_type = self.input_type?;
        Some(Question {
            id: id.into(),
            prompt_text: title.clone(),
            title,
            description,
            input_type,
            options: self.options,
            suggested_answers: self.suggested_answers,
            required: false,
            scale: None,
        })
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}
