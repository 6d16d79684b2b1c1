use anyhow::ensure;
use clap::Subcommand;
use kontakt_config::Config;
use kontakt_email_contracts::{Email, EmailService};
use kontakt_email_impl::EmailServiceImpl;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test { recipient: String },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: String) -> anyhow::Result<()> {
    let email_service = EmailServiceImpl::new(config.email);

    let ok = email_service
        .send(Email {
            recipient,
            subject: "Email Deliverability Test".into(),
            text_body: "Email deliverability seems to be working!".into(),
            html_body: "<p>Email deliverability seems to be working!</p>".into(),
            reply_to: None,
        })
        .await?;

    ensure!(ok, "Failed to send email");

    Ok(())
}
