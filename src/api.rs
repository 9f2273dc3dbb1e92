use std::time::Duration;

use async_trait::async_trait;
use invite::{
    Admission, GateStrategy, RsvpSubmission,
    payloads::{
        ConfirmationRequest, ConfirmationResponse, ErrorBody, SearchNamesRequest,
        SearchNamesResponse, SubmitResponse, VerifyNameRequest, VerifyNameResponse,
        VerifyPinRequest, VerifyPinResponse,
    },
};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server answered {status}: {error}")]
    Status { status: u16, error: String },
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

/// What the guest workflow needs from the backend.
#[async_trait]
pub trait RsvpApi: Send + Sync {
    /// Which gate the backend runs. Decides whether suggestions are offered.
    fn strategy(&self) -> GateStrategy;

    /// Runs the active gate on a name or PIN.
    async fn verify(&self, candidate: &str) -> Result<Admission, ApiError>;

    async fn search_names(&self, term: &str) -> Result<Vec<String>, ApiError>;

    async fn submit_rsvp(&self, submission: &RsvpSubmission) -> Result<SubmitResponse, ApiError>;

    /// `Ok(false)` and `Err` both mean the guest got no email.
    async fn send_confirmation(&self, request: &ConfirmationRequest) -> Result<bool, ApiError>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
    strategy: GateStrategy,
}

impl HttpApi {
    pub fn new(base_url: &str, strategy: GateStrategy) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, strategy, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        strategy: GateStrategy,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            strategy,
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };

            return Err(ApiError::Status {
                status: status.as_u16(),
                error,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RsvpApi for HttpApi {
    fn strategy(&self) -> GateStrategy {
        self.strategy
    }

    async fn verify(&self, candidate: &str) -> Result<Admission, ApiError> {
        let route = self.strategy.route();

        match self.strategy {
            GateStrategy::Names => {
                let request = VerifyNameRequest {
                    name: Some(candidate.to_string()),
                };
                let response: VerifyNameResponse = self.post(route, &request).await?;

                Ok(response.into())
            }
            GateStrategy::Pin => {
                let request = VerifyPinRequest {
                    pin: Some(candidate.to_string()),
                };
                let response: VerifyPinResponse = self.post(route, &request).await?;

                Ok(if response.is_valid {
                    Admission::Admitted {
                        canonical_name: None,
                    }
                } else {
                    Admission::NotAdmitted
                })
            }
        }
    }

    async fn search_names(&self, term: &str) -> Result<Vec<String>, ApiError> {
        let request = SearchNamesRequest {
            search: Some(term.to_string()),
        };
        let response: SearchNamesResponse = self.post("/search-names", &request).await?;

        Ok(response.suggestions)
    }

    async fn submit_rsvp(&self, submission: &RsvpSubmission) -> Result<SubmitResponse, ApiError> {
        self.post("/rsvp-submit", submission).await
    }

    async fn send_confirmation(&self, request: &ConfirmationRequest) -> Result<bool, ApiError> {
        let response: ConfirmationResponse = self.post("/send-confirmation", request).await?;

        Ok(response.success)
    }
}
