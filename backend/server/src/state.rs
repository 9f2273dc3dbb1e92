use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use super::{
    config::Config,
    database::{DEFAULT_PREFIX, GuestDirectory, RedisStore, RsvpStore, init_redis},
    gate::Gate,
    notifier::{DisabledMailer, Mailer, ResendMailer},
};

pub struct AppState {
    pub config: Config,
    pub gate: Gate,
    pub guests: Arc<dyn GuestDirectory>,
    pub rsvps: Arc<dyn RsvpStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Connects to Redis and the email provider named in `config`.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let connection = init_redis(&config.redis_url, config.service_timeout)
            .await
            .with_context(|| format!("connecting to {}", config.redis_url))?;
        let store = Arc::new(RedisStore::new(
            connection,
            DEFAULT_PREFIX,
            config.submission_ttl,
        ));

        let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
            Some(api_key) => Arc::new(
                ResendMailer::new(api_key, config.service_timeout)
                    .context("building email client")?,
            ),
            None => {
                warn!("RESEND_API_KEY missing, confirmation emails are disabled");
                Arc::new(DisabledMailer)
            }
        };

        Ok(Self::with_parts(config, store.clone(), store, mailer))
    }

    /// Assembles state from already-built parts.
    pub fn with_parts(
        config: Config,
        guests: Arc<dyn GuestDirectory>,
        rsvps: Arc<dyn RsvpStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Arc<Self> {
        let gate = Gate::from_config(&config, guests.clone());
        info!(strategy = %gate.strategy(), "Identity gate ready");

        Arc::new(Self {
            config,
            gate,
            guests,
            rsvps,
            mailer,
        })
    }
}
