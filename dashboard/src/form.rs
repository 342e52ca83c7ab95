//! Student create/edit form.
//!
//! # Design
//! The form owns the raw values a person typed, validates them before any
//! request leaves, and submits either a create or an update depending on
//! whether it was opened on an existing student. The outcome is reported as
//! a settled `Toast`; the values stay in place so a rejected submission can
//! be corrected and resent.
//!
//! `FormState` runs `Idle -> Submitting -> Resolved | Rejected -> Idle`.
//! Input that fails validation never leaves `Idle`.

use serde::{Deserialize, Serialize};
use tutor_core::{Envelope, Student, StudentInput};

use crate::api::Api;
use crate::toast::{PendingToast, Toast};

pub const MIN_AGE: i64 = 6;
pub const MAX_AGE: i64 = 18;
pub const MIN_NAME_LEN: usize = 2;

/// Route whose cached render goes stale after a student changes.
pub const STUDENTS_ROUTE: &str = "dashboard/students";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Idle,
    Submitting,
    Resolved,
    Rejected,
}

impl FormState {
    pub fn can_become(self, next: FormState) -> bool {
        matches!(
            (self, next),
            (FormState::Idle, FormState::Submitting)
                | (FormState::Submitting, FormState::Resolved)
                | (FormState::Submitting, FormState::Rejected)
                | (FormState::Resolved, FormState::Idle)
                | (FormState::Rejected, FormState::Idle)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

/// Raw field values as posted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFormValues {
    pub name: String,
    pub age: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub age: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }
}

pub fn validate_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err("Name must be at least 2 characters long.".to_string());
    }
    Ok(name.to_string())
}

pub fn validate_age(age: i64) -> Result<u8, String> {
    if age < MIN_AGE {
        return Err(format!("Minimal age must be {MIN_AGE}"));
    }
    if age > MAX_AGE {
        return Err(format!("Maximum age must be {MAX_AGE}"));
    }
    u8::try_from(age).map_err(|_| format!("Maximum age must be {MAX_AGE}"))
}

fn parse_age(raw: &str) -> Result<u8, String> {
    let age: i64 = raw
        .trim()
        .parse()
        .map_err(|_| "Age must be a number".to_string())?;
    validate_age(age)
}

#[derive(Debug, Clone)]
pub struct StudentForm {
    mode: FormMode,
    values: StudentFormValues,
    state: FormState,
    last_outcome: Option<FormState>,
    errors: FieldErrors,
}

impl StudentForm {
    pub fn create(defaults: StudentFormValues) -> Self {
        Self::new(FormMode::Create, defaults)
    }

    /// Pre-filled from `student`.
    pub fn edit(student: &Student) -> Self {
        Self::new(
            FormMode::Edit(student.id),
            StudentFormValues {
                name: student.name.clone(),
                age: student.age.to_string(),
            },
        )
    }

    fn new(mode: FormMode, values: StudentFormValues) -> Self {
        Self {
            mode,
            values,
            state: FormState::Idle,
            last_outcome: None,
            errors: FieldErrors::default(),
        }
    }

    /// Replace the field values, as when the user types.
    pub fn fill(&mut self, values: StudentFormValues) {
        self.values = values;
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn values(&self) -> &StudentFormValues {
        &self.values
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// `Resolved` or `Rejected` for the most recent submission.
    pub fn last_outcome(&self) -> Option<FormState> {
        self.last_outcome
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn validate(&self) -> Result<StudentInput, FieldErrors> {
        let name = validate_name(&self.values.name);
        let age = parse_age(&self.values.age);
        match (name, age) {
            (Ok(name), Ok(age)) => Ok(StudentInput { name, age }),
            (name, age) => Err(FieldErrors {
                name: name.err(),
                age: age.err(),
            }),
        }
    }

    /// Validate, then create or update through `api`.
    ///
    /// Returns the field errors without touching the network when validation
    /// fails; otherwise the settled toast carrying the backend's message.
    pub async fn submit(&mut self, api: &Api) -> Result<Toast, FieldErrors> {
        let input = match self.validate() {
            Ok(input) => input,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(errors);
            }
        };
        self.errors = FieldErrors::default();

        self.transition(FormState::Submitting);
        let pending = PendingToast::new();
        let envelope: Envelope<Student> = match self.mode {
            FormMode::Create => api.create("students", &input, STUDENTS_ROUTE).await,
            FormMode::Edit(id) => {
                api.update(&format!("students/{id}"), &input, STUDENTS_ROUTE)
                    .await
            }
        };

        let outcome = if envelope.is_success() {
            FormState::Resolved
        } else {
            FormState::Rejected
        };
        self.transition(outcome);
        self.last_outcome = Some(outcome);
        let toast = pending.settle(&envelope);
        self.transition(FormState::Idle);
        Ok(toast)
    }

    fn transition(&mut self, next: FormState) {
        debug_assert!(
            self.state.can_become(next),
            "illegal form transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(from = ?self.state, to = ?next, "student form");
        self.state = next;
    }
}
