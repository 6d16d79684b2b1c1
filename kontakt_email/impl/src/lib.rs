use std::sync::Arc;

use anyhow::{anyhow, Context};
use kontakt_config::{EmailConfig, SmtpConfig};
use kontakt_email_contracts::{Email, EmailError, EmailService};
use kontakt_utils::Apply;
use lettre::{
    message::{Mailbox, MessageBuilder, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tokio::sync::OnceCell;

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

/// SMTP-backed [`EmailService`].
///
/// The transport is constructed lazily on first use and shared by all clones
/// for the lifetime of the process. Construction fails per call (never
/// process-fatal) while the SMTP settings are incomplete.
#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    config: EmailConfig,
    transport: Arc<OnceCell<SmtpTransport>>,
}

impl EmailServiceImpl {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            transport: Arc::default(),
        }
    }

    async fn transport(&self) -> Result<(&SmtpConfig, &SmtpTransport), EmailError> {
        let smtp = self.config.smtp.as_ref().ok_or(EmailError::NotConfigured)?;
        let transport = self
            .transport
            .get_or_try_init(|| async { build_transport(smtp).map_err(EmailError::Other) })
            .await?;
        Ok((smtp, transport))
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> Result<bool, EmailError> {
        let (smtp, transport) = self.transport().await?;

        let message = Message::builder()
            .from(mailbox(&smtp.from)?)
            .to(mailbox(&email.recipient)?)
            .apply_map(
                email.reply_to.as_deref().map(mailbox).transpose()?,
                MessageBuilder::reply_to,
            )
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(
                email.text_body,
                email.html_body,
            ))
            .context("Failed to build mime message")?;

        transport
            .send(message)
            .await
            .map(|response| response.is_positive())
            .map_err(|err| anyhow::Error::new(err).into())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let (_, transport) = self.transport().await?;
        transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

fn mailbox(address: &str) -> anyhow::Result<Mailbox> {
    address
        .parse()
        .with_context(|| format!("Invalid email address {address:?}"))
}

fn build_transport(smtp: &SmtpConfig) -> anyhow::Result<SmtpTransport> {
    let tls_parameters = TlsParameters::new(smtp.host.clone())
        .context("Failed to set up tls for the smtp transport")?;
    let tls = if smtp.secure {
        Tls::Wrapper(tls_parameters)
    } else {
        Tls::Opportunistic(tls_parameters)
    };

    Ok(SmtpTransport::builder_dangerous(smtp.host.clone())
        .port(smtp.port)
        .tls(tls)
        .credentials(Credentials::new(smtp.user.clone(), smtp.pass.clone()))
        .build())
}
