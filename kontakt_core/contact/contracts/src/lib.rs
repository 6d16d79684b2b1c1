use std::future::Future;

use kontakt_email_contracts::EmailError;
use kontakt_models::contact::ContactSubmission;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactService: Send + Sync + 'static {
    /// Validates the submission, composes the contact email and hands it to
    /// the SMTP relay.
    fn submit(
        &self,
        submission: ContactSubmission,
    ) -> impl Future<Output = Result<(), ContactSubmitError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error(transparent)]
    Validation(#[from] ContactValidationError),
    #[error("Failed to send message.")]
    Send,
    #[error(transparent)]
    Email(#[from] EmailError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContactValidationError {
    #[error("Missing required fields.")]
    MissingFields,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Message too long.")]
    MessageTooLong,
}

#[cfg(feature = "mock")]
impl MockContactService {
    pub fn with_submit(
        mut self,
        submission: ContactSubmission,
        result: Result<(), ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
