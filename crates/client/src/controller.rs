use consultoria_contact::{FormState, ValidationErrorSet, validate_all};

use crate::{Ack, SubmissionClient, SubmissionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted by the server; the form has been cleared.
    Sent(Ack),
    /// Nothing was sent. The same errors are kept on the form state.
    Invalid(ValidationErrorSet),
    /// Another submission from this form is still in flight.
    AlreadySubmitting,
}

/// Drives one contact form: validation, the in-flight guard and the call to
/// the intake endpoint.
#[derive(Debug, Default)]
pub struct FormController {
    state: FormState,
    client: SubmissionClient,
}

impl FormController {
    pub fn new(client: SubmissionClient) -> Self {
        Self {
            state: FormState::default(),
            client,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Submit the current form values.
    ///
    /// On failure the values are kept so the user can resubmit by hand.
    pub async fn handle_submit(&self) -> Result<SubmitOutcome, SubmissionError> {
        if self.state.is_submitting() {
            return Ok(SubmitOutcome::AlreadySubmitting);
        }

        let values = self.state.values();
        let errors = validate_all(&values);
        self.state.set_errors(errors.clone());
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "contact form has invalid fields");
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let Ok(_guard) = self.state.begin_submit() else {
            return Ok(SubmitOutcome::AlreadySubmitting);
        };

        let ack = self.client.submit(&values).await?;
        self.state.reset();

        Ok(SubmitOutcome::Sent(ack))
    }
}
