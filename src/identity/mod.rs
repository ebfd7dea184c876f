use crate::{
    error::AuthError,
    models::{AuthProvider, User},
};
use async_trait::async_trait;
use std::time::Duration;

/// Source of signed-in users. The pipeline treats the result as opaque display data.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, provider: AuthProvider) -> Result<User, AuthError>;
}

/// Stand-in for a real OAuth round-trip: waits, then returns a fixed demo account.
#[derive(Debug, Clone)]
pub struct DemoIdentityProvider {
    delay: Duration,
}

impl Default for DemoIdentityProvider {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1500),
        }
    }
}

impl DemoIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl IdentityProvider for DemoIdentityProvider {
    async fn authenticate(&self, provider: AuthProvider) -> Result<User, AuthError> {
        log::info!("Authenticating with {}...", provider);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let user = match provider {
            AuthProvider::Google => User {
                email: "demo.user@gmail.com".to_string(),
                name: "Demo User".to_string(),
                provider,
            },
            AuthProvider::LinkedIn => User {
                email: "user.professional@linkedin.com".to_string(),
                name: "Professional User".to_string(),
                provider,
            },
        };
        Ok(user)
    }
}
