use std::{net::IpAddr, path::PathBuf};

use axum::Router;
use kontakt_core_contact_contracts::ContactService;
use kontakt_core_health_contracts::HealthService;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

mod extractors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Contact, Health> {
    contact: Contact,
    health: Health,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    /// Directory served for any request that no API route matches.
    pub static_dir: PathBuf,
}

impl<Contact, Health> RestServer<Contact, Health>
where
    Contact: ContactService,
    Health: HealthService,
{
    pub fn new(contact: Contact, health: Health, config: RestServerConfig) -> Self {
        Self {
            contact,
            health,
            config,
        }
    }

    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind((host, port)).await?;
        axum::serve(listener, router).await.map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let router = Router::new()
            .merge(routes::contact::router(self.contact.into()))
            .merge(routes::health::router(self.health.into()))
            .fallback_service(ServeDir::new(&self.config.static_dir));

        // Outermost last: the request id must be assigned before the trace
        // span reads it, and the panic handler has to wrap everything.
        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        middlewares::panic_handler::add(router)
    }
}
