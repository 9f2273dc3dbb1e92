//! # Confirmation Notifier
//!
//! Sends one templated email per recorded RSVP through the Resend HTTP API.
//!
//! Runs strictly after the record is stored and never undoes it. A failed send
//! only downgrades the guest's success message.
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use invite::Attending;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::{sync::Mutex, time::error::Elapsed};
use tracing::{info, warn};

use crate::{
    templates,
    utils::{bounded, mask_email},
};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Email provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Email provider timed out: {0}")]
    Timeout(#[from] Elapsed),

    #[error("Email delivery not configured")]
    NotConfigured,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

pub struct ResendMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: &str, request_timeout: Duration) -> Result<Self, NotifyError> {
        Self::with_endpoint(api_key, RESEND_ENDPOINT, request_timeout)
    }

    pub fn with_endpoint(
        api_key: &str,
        endpoint: &str,
        request_timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        let body = ResendEmail {
            from: &email.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Stands in when no provider key is configured. Every send fails so guests
/// see the "recorded, but no email" message instead of a false confirmation.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        warn!(to = %mask_email(&email.to), subject = %email.subject, "Dropping email, no provider configured");

        Err(NotifyError::NotConfigured)
    }
}

/// Keeps messages in memory instead of sending them.
#[derive(Default)]
pub struct OutboxMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl OutboxMailer {
    /// While set, every send is rejected as if the provider were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "provider down".to_string(),
            });
        }

        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

pub async fn notify(
    mailer: &dyn Mailer,
    sender: &str,
    email: &str,
    name: &str,
    attending: Attending,
    limit: Duration,
) -> Result<(), NotifyError> {
    let rendered = templates::confirmation(name, attending);
    let outgoing = OutgoingEmail {
        from: sender.to_string(),
        to: email.trim().to_string(),
        subject: rendered.subject.to_string(),
        html: rendered.html,
    };

    bounded(limit, mailer.send(&outgoing)).await?;
    info!(to = %mask_email(email), %attending, "Sent confirmation email");

    Ok(())
}
