use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use kontakt_core_health_contracts::{HealthService, HealthStatus};
use kontakt_email_contracts::EmailService;
use tokio::sync::RwLock;
use tracing::error;

/// Probes SMTP reachability and caches the result so that uptime monitors
/// cannot hammer the relay.
#[derive(Debug, Clone)]
pub struct HealthServiceImpl<Email> {
    email: Email,
    config: HealthServiceConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthServiceConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    timestamp: Instant,
}

impl<Email> HealthServiceImpl<Email> {
    pub fn new(email: Email, config: HealthServiceConfig) -> Self {
        Self {
            email,
            config,
            state: Arc::default(),
        }
    }
}

impl<Email> HealthService for HealthServiceImpl<Email>
where
    Email: EmailService,
{
    async fn get_status(&self) -> HealthStatus {
        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| c.timestamp.elapsed() < self.config.cache_ttl)
        {
            return cached.status;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| c.timestamp.elapsed() < self.config.cache_ttl)
        {
            return cached.status;
        }

        let email = self
            .email
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping smtp server: {err:#}"))
            .is_ok();

        let status = HealthStatus { email };
        *cache_guard = Some(CachedStatus {
            status,
            timestamp: Instant::now(),
        });

        status
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use kontakt_email_contracts::MockEmailService;

    use super::*;

    #[tokio::test]
    async fn reports_reachable_smtp_server() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_ping()
            .once()
            .returning(|| Box::pin(std::future::ready(Ok(()))));
        let sut = HealthServiceImpl::new(
            email,
            HealthServiceConfig {
                cache_ttl: Duration::from_secs(60),
            },
        );

        // Act
        let status = sut.get_status().await;

        // Assert
        assert_eq!(status, HealthStatus { email: true });
    }

    #[tokio::test]
    async fn reports_unreachable_smtp_server() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_ping()
            .once()
            .returning(|| Box::pin(std::future::ready(Err(anyhow!("connection refused")))));
        let sut = HealthServiceImpl::new(
            email,
            HealthServiceConfig {
                cache_ttl: Duration::from_secs(60),
            },
        );

        // Act
        let status = sut.get_status().await;

        // Assert
        assert_eq!(status, HealthStatus { email: false });
    }

    #[tokio::test]
    async fn caches_status_within_ttl() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_ping()
            .once()
            .returning(|| Box::pin(std::future::ready(Ok(()))));
        let sut = HealthServiceImpl::new(
            email,
            HealthServiceConfig {
                cache_ttl: Duration::from_secs(60),
            },
        );

        // Act
        let first = sut.get_status().await;
        let second = sut.get_status().await;

        // Assert
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn expired_cache_is_refreshed() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_ping()
            .times(2)
            .returning(|| Box::pin(std::future::ready(Ok(()))));
        let sut = HealthServiceImpl::new(
            email,
            HealthServiceConfig {
                cache_ttl: Duration::ZERO,
            },
        );

        // Act + Assert
        assert_eq!(sut.get_status().await, HealthStatus { email: true });
        assert_eq!(sut.get_status().await, HealthStatus { email: true });
    }
}
