use crate::config::ApiConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

/// Fake-data API resources consumed by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Users,
    CreditCard,
    Subscription,
    Stripe,
    GoogleAuth,
    LinkedinAuth,
    AppleAuth,
}

impl Endpoint {
    /// Path below the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Users => "users/random_user",
            Endpoint::CreditCard => "business_credit_card/random_card",
            Endpoint::Subscription => "subscription/random_subscription",
            Endpoint::Stripe => "stripe/random_stripe",
            Endpoint::GoogleAuth => "omniauth/google_get",
            Endpoint::LinkedinAuth => "omniauth/linkedin_get",
            Endpoint::AppleAuth => "omniauth/apple_get",
        }
    }
}

/// Remote source of externally generated records
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError>;
}

/// Client for random-data-api.com style endpoints
pub struct RandomDataApi {
    client: reqwest::Client,
    base_url: String,
    size: usize,
}

impl RandomDataApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            size: config.size,
        }
    }

    /// Full URL of an endpoint, without the query string
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl RemoteSource for RandomDataApi {
    #[instrument(skip(self))]
    async fn fetch(&self, endpoint: Endpoint) -> Result<Value, FetchError> {
        let url = self.endpoint_url(endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[("size", self.size)])
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })?;

        debug!(
            url = %url,
            records = body.as_array().map(Vec::len).unwrap_or(1),
            "Fetched fake records"
        );

        Ok(body)
    }
}
