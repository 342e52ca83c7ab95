//! Transient notifications for mutations.
//!
//! A toast is born pending and settles exactly once, to success or error.
//! The two stages are separate types: `PendingToast` can only become a
//! `Toast` by settling, and a settled `Toast` has no way back, so a toast
//! that skips the pending phase cannot be built.
//!
//! Pages are rendered once the backend has answered, so the pending phase
//! never reaches a browser on its own. It lives in the typestate and in
//! `Toast::history`; what the page shows is the settled outcome.

use serde::Serialize;
use tutor_core::Envelope;

pub const LOADING: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum ToastPhase {
    Pending(String),
    Success(String),
    Error(String),
}

#[derive(Debug)]
pub struct PendingToast {
    label: String,
}

impl PendingToast {
    pub fn new() -> Self {
        Self::with_label(LOADING)
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn phase(&self) -> ToastPhase {
        ToastPhase::Pending(self.label.clone())
    }

    pub fn resolve(self, message: impl Into<String>) -> Toast {
        self.finish(ToastPhase::Success(message.into()))
    }

    pub fn reject(self, message: impl Into<String>) -> Toast {
        self.finish(ToastPhase::Error(message.into()))
    }

    /// Success or error, with the envelope's message either way.
    pub fn settle<T>(self, envelope: &Envelope<T>) -> Toast {
        match envelope {
            Envelope::Success { message, .. } => self.resolve(message.as_str()),
            Envelope::Failure { message } => self.reject(message.as_str()),
        }
    }

    fn finish(self, outcome: ToastPhase) -> Toast {
        Toast {
            pending: ToastPhase::Pending(self.label),
            outcome,
        }
    }
}

impl Default for PendingToast {
    fn default() -> Self {
        Self::new()
    }
}

/// A settled toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pending: ToastPhase,
    outcome: ToastPhase,
}

impl Toast {
    pub fn phase(&self) -> &ToastPhase {
        &self.outcome
    }

    pub fn text(&self) -> &str {
        match &self.outcome {
            ToastPhase::Pending(text) | ToastPhase::Success(text) | ToastPhase::Error(text) => text,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToastPhase::Success(_))
    }

    /// Phases in the order they were shown.
    pub fn history(&self) -> [&ToastPhase; 2] {
        [&self.pending, &self.outcome]
    }
}
