use std::sync::{
    PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};

use crate::{ContactSubmission, Field, ValidationErrorSet};

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[error("a submission is already in progress")]
pub struct AlreadySubmitting;

/// State of one contact form instance: current values, the latest
/// validation result and the in-flight flag.
#[derive(Debug, Default)]
pub struct FormState {
    values: RwLock<ContactSubmission>,
    errors: RwLock<ValidationErrorSet>,
    submitting: AtomicBool,
}

impl FormState {
    pub fn values(&self) -> ContactSubmission {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_values(&self, values: ContactSubmission) {
        *self.values.write().unwrap_or_else(PoisonError::into_inner) = values;
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(field, value);
    }

    pub fn errors(&self) -> ValidationErrorSet {
        self.errors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_errors(&self, errors: ValidationErrorSet) {
        *self.errors.write().unwrap_or_else(PoisonError::into_inner) = errors;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Mark the form as submitting. The returned guard clears the flag when
    /// dropped, so every exit path of the caller ends the submission.
    pub fn begin_submit(&self) -> Result<SubmitGuard<'_>, AlreadySubmitting> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AlreadySubmitting)?;

        Ok(SubmitGuard { state: self })
    }

    pub fn end_submit(&self) {
        self.submitting.store(false, Ordering::Release);
    }

    /// Clear values and errors after a successful send.
    pub fn reset(&self) {
        self.set_values(ContactSubmission::default());
        self.set_errors(ValidationErrorSet::default());
    }
}

#[must_use = "dropping the guard ends the submission immediately"]
pub struct SubmitGuard<'a> {
    state: &'a FormState,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.state.end_submit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_submit_rejects_second_caller() {
        let state = FormState::default();
        assert!(!state.is_submitting());

        let guard = state.begin_submit().unwrap();
        assert!(state.is_submitting());
        assert_eq!(state.begin_submit().err(), Some(AlreadySubmitting));

        drop(guard);
        assert!(!state.is_submitting());
        assert!(state.begin_submit().is_ok());
    }

    #[test]
    fn test_flag_cleared_when_caller_unwinds() {
        let state = FormState::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = state.begin_submit().unwrap();
            panic!("network exploded");
        }));

        assert!(result.is_err());
        assert!(!state.is_submitting());
    }

    #[test]
    fn test_reset_clears_values_and_errors() {
        let state = FormState::default();
        state.set_field(Field::Nombre, "Ana");
        state.set_errors(crate::validate(Field::Email, ""));
        assert_eq!(state.values().nombre, "Ana");
        assert_eq!(state.errors().len(), 1);

        state.reset();
        assert_eq!(state.values(), ContactSubmission::default());
        assert!(state.errors().is_empty());
    }
}
