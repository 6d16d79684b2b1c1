use kontakt_core_contact_contracts::{ContactService, ContactSubmitError};
use kontakt_email_contracts::{Email, EmailError, EmailService};
use kontakt_models::contact::ContactSubmission;

pub mod message;

use crate::message::{compose, validate};

#[derive(Debug, Clone)]
pub struct ContactServiceImpl<Email> {
    email: Email,
    config: ContactServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    /// Resolved contact recipient. `None` while the deployment provides
    /// neither `CONTACT_RECIPIENT` nor `SMTP_USER`.
    pub recipient: Option<String>,
}

impl<Email> ContactServiceImpl<Email> {
    pub fn new(email: Email, config: ContactServiceConfig) -> Self {
        Self { email, config }
    }
}

impl<EmailS> ContactService for ContactServiceImpl<EmailS>
where
    EmailS: EmailService,
{
    async fn submit(&self, submission: ContactSubmission) -> Result<(), ContactSubmitError> {
        validate(&submission)?;

        let recipient = self
            .config
            .recipient
            .clone()
            .ok_or(EmailError::NotConfigured)?;

        let message = compose(&submission);
        let email = Email {
            recipient,
            subject: message.subject,
            text_body: message.text,
            html_body: message.html,
            reply_to: Some(submission.email),
        };

        if !self.email.send(email).await? {
            return Err(ContactSubmitError::Send);
        }

        Ok(())
    }
}
