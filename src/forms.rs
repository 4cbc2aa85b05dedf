//! Form submission outcomes and validation helpers.
//!
//! A write request either persists its entity or comes back as a failure that
//! carries the submitted values (the "draft") and one summarized message, so
//! the form can be shown again without losing what was typed.

use std::borrow::Cow;

use serde::Serialize;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

/// Submitted form values, echoed back after a failed write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draft<F> {
    /// Id of the entity being edited; `None` on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub fields: F,
}

impl<F> Draft<F> {
    pub fn new(fields: F) -> Self {
        Self { id: None, fields }
    }

    pub fn editing(id: Uuid, fields: F) -> Self {
        Self { id: Some(id), fields }
    }
}

/// Result of a create or update submission
#[derive(Debug)]
pub enum WriteOutcome<T, F> {
    Saved(T),
    ValidationFailed { draft: Draft<F>, message: String },
    PersistFailed { draft: Draft<F>, message: String },
    /// The entity to update does not exist; there is nothing to echo
    NotFound,
}

impl<T, F> WriteOutcome<T, F> {
    pub fn invalid(draft: Draft<F>, messages: Vec<String>) -> Self {
        WriteOutcome::ValidationFailed {
            draft,
            message: join_messages(&messages),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            WriteOutcome::ValidationFailed { message, .. }
            | WriteOutcome::PersistFailed { message, .. } => Some(message),
            WriteOutcome::Saved(_) | WriteOutcome::NotFound => None,
        }
    }
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Failed,
}

/// Join validation messages into the single line shown above a form
pub fn join_messages(messages: &[String]) -> String {
    messages.join(", ")
}

/// Flatten `validator` errors into readable messages.
///
/// `fields` lists `(field, label)` pairs in form order; messages come out in that
/// order regardless of how the validator stored them.
pub fn messages(errors: &ValidationErrors, fields: &[(&str, &str)]) -> Vec<String> {
    let by_field = errors.field_errors();

    fields
        .iter()
        .filter_map(|(field, label)| by_field.get(*field).map(|errs| (label, errs)))
        .flat_map(|(label, errs)| {
            errs.iter().map(move |e| {
                format!("{} {}", label, e.message.as_deref().unwrap_or("is invalid"))
            })
        })
        .collect()
}

pub(crate) fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects empty and whitespace-only values
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "can't be blank"));
    }
    Ok(())
}
