//! Commerce backend API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for carts, addresses, profiles,
//!   services, and orders - NO local sync, direct API calls
//! - Plain JSON over HTTP via `reqwest` with a server-side bearer token
//! - In-memory caching via `moka` for landing-page reads (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use mashtal_storefront::commerce::CommerceClient;
//!
//! let client = CommerceClient::new(&config.commerce)?;
//! let items = client.get_cart("u-42", Locale::En).await?;
//! let confirmation = client.checkout(&request).await?;
//! ```

pub mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use crate::config::CommerceApiConfig;
use crate::i18n::Locale;

/// Errors that can occur when interacting with the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response was missing a required field.
    #[error("Response missing required field: {0}")]
    MissingField(&'static str),
}

/// Cache key for landing-page reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Services,
    TopProducts,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Services(Vec<Service>),
    TopProducts(Vec<TopProduct>),
}

/// Client for the commerce backend API.
///
/// Cheaply cloneable; landing-page reads are cached for 5 minutes.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CommerceApiConfig) -> Result<Self, CommerceError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| CommerceError::Parse(format!("Invalid API token format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// GET a JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CommerceError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    /// POST a JSON body and decode a JSON response.
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CommerceError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CommerceError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| CommerceError::Parse(e.to_string()))
    }

    /// Authenticate a customer with email and password.
    ///
    /// A response without both a token and a user id is a failed login,
    /// whatever the status code says.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is incomplete.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        language: Locale,
    ) -> Result<AuthSession, CommerceError> {
        let body = LoginRequest {
            email,
            password,
            language,
        };
        let response: LoginResponseBody = self.post_json("/auth/login", &body).await?;

        let token = response.token.ok_or(CommerceError::MissingField("token"))?;
        let user_id = response
            .user
            .and_then(|u| u.id)
            .ok_or(CommerceError::MissingField("user.id"))?;

        Ok(AuthSession {
            token,
            user_id: user_id.to_string(),
        })
    }

    /// Fetch the customer's cart snapshot for a locale.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(
        &self,
        user_id: &str,
        locale: Locale,
    ) -> Result<Vec<CartItem>, CommerceError> {
        self.get_json(&format!("/cart?user_id={user_id}&locale={locale}"))
            .await
    }

    /// Fetch the customer's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_addresses(&self, user_id: &str) -> Result<Vec<Address>, CommerceError> {
        self.get_json(&format!("/users/{user_id}/addresses")).await
    }

    /// Fetch the customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, CommerceError> {
        self.get_json(&format!("/users/{user_id}")).await
    }

    /// Fetch the services list (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn get_services(&self) -> Result<Vec<Service>, CommerceError> {
        if let Some(CacheValue::Services(services)) = self.inner.cache.get(&CacheKey::Services).await
        {
            return Ok(services);
        }

        let services: Vec<Service> = self.get_json("/services").await?;
        self.inner
            .cache
            .insert(CacheKey::Services, CacheValue::Services(services.clone()))
            .await;
        Ok(services)
    }

    /// Fetch the top-selling products (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn get_top_products(&self) -> Result<Vec<TopProduct>, CommerceError> {
        if let Some(CacheValue::TopProducts(products)) =
            self.inner.cache.get(&CacheKey::TopProducts).await
        {
            return Ok(products);
        }

        let products: Vec<TopProduct> = self.get_json("/products/top").await?;
        self.inner
            .cache
            .insert(
                CacheKey::TopProducts,
                CacheValue::TopProducts(products.clone()),
            )
            .await;
        Ok(products)
    }

    /// Submit a checkout request.
    ///
    /// The backend must confirm with both an order code and a total;
    /// anything else is treated as a failed checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the confirmation is
    /// incomplete.
    #[instrument(skip(self, request))]
    pub async fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutConfirmation, CommerceError> {
        let body: CheckoutResponseBody = self.post_json("/orders/checkout", request).await?;

        let order_code = body
            .order_code
            .ok_or(CommerceError::MissingField("order_code"))?;
        let total = body.total.ok_or(CommerceError::MissingField("total"))?;

        Ok(CheckoutConfirmation {
            order_code: order_code.to_string(),
            total: format!("{total:.2}"),
        })
    }

    /// Clear the customer's remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: &str, locale: Locale) -> Result<(), CommerceError> {
        let body = serde_json::json!({
            "user_id": user_id,
            "locale": locale,
        });
        let response = self
            .inner
            .client
            .post(self.url("/cart/clear"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
