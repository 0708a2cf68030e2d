use serde::Serialize;
use std::fmt::Display;
use tracing::warn;

/// A best-effort side effect that failed without failing its operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryFailure {
    pub step: String,
    pub message: String,
}

/// Attempts an advisory step: a failure is logged and swallowed.
pub fn advisory<T, E: Display>(step: &str, subject: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!("[advisory] {step} for {subject} failed: {error}");
            None
        }
    }
}

/// Collects the advisory failures of one multi-step operation.
#[derive(Debug)]
pub struct Advisories {
    subject: String,
    failures: Vec<AdvisoryFailure>,
}

impl Advisories {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            failures: Vec::new(),
        }
    }

    pub fn attempt<T, E: Display>(&mut self, step: &str, result: Result<T, E>) -> Option<T> {
        let message = match &result {
            Ok(_) => None,
            Err(error) => Some(error.to_string()),
        };
        let value = advisory(step, &self.subject, result);
        if let Some(message) = message {
            self.failures.push(AdvisoryFailure {
                step: step.to_string(),
                message,
            });
        }
        value
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_failures(self) -> Vec<AdvisoryFailure> {
        self.failures
    }
}

/// Outcome of a successful create: the entity exists, but some advisory
/// steps (limits, autostart, provisioning) may not have taken effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateReport {
    pub name: String,
    pub advisories: Vec<AdvisoryFailure>,
}

impl CreateReport {
    pub fn new(name: impl Into<String>, advisories: Advisories) -> Self {
        Self {
            name: name.into(),
            advisories: advisories.into_failures(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }
}
