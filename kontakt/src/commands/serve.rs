use kontakt_api_rest::{RestServer, RestServerConfig};
use kontakt_config::Config;
use kontakt_core_contact_impl::{ContactServiceConfig, ContactServiceImpl};
use kontakt_core_health_impl::{HealthServiceConfig, HealthServiceImpl};
use kontakt_email_impl::EmailServiceImpl;
use tracing::{info, warn};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    if config.email.smtp.is_none() {
        warn!("SMTP settings are incomplete, contact messages cannot be delivered");
    }

    let email = EmailServiceImpl::new(config.email.clone());
    let contact = ContactServiceImpl::new(
        email.clone(),
        ContactServiceConfig {
            recipient: config.email.recipient.clone(),
        },
    );
    let health = HealthServiceImpl::new(
        email,
        HealthServiceConfig {
            cache_ttl: config.health.status_cache_ttl.into(),
        },
    );

    let server = RestServer::new(
        contact,
        health,
        RestServerConfig {
            static_dir: config.static_dir.clone(),
        },
    );

    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve(config.http.host, config.http.port).await
}
