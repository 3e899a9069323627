use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::error::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerErrorKind {
    InvalidRequest,
    InvariantViolation,
    External,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerError {
    pub kind: SchedulerErrorKind,
    pub message: String,
}

impl SchedulerError {
    pub fn new(kind: SchedulerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SchedulerError {}

impl From<ActionError> for SchedulerError {
    fn from(err: ActionError) -> Self {
        external_error(err.to_string())
    }
}

pub fn invalid_request(message: impl Into<String>) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::InvalidRequest, message)
}

pub fn invariant_violation(message: impl Into<String>) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::InvariantViolation, message)
}

pub fn external_error(message: impl Into<String>) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::External, message)
}

pub fn internal_error(message: impl Into<String>) -> SchedulerError {
    SchedulerError::new(SchedulerErrorKind::Internal, message)
}
