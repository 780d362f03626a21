//! Storefront API client for stock and catalog lookups.
//!
//! Plain REST JSON over `reqwest`: `GET {base}/stock/{id}` returns the
//! available quantity for a product, `GET {base}/products/{id}` returns its
//! catalog metadata. Product metadata is cached via `moka` (5-minute TTL);
//! stock is mutable state and is never cached.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use shoebox_core::ProductId;

use crate::config::ApiConfig;
use crate::models::{Product, StockRecord};
use crate::ports::{Catalog, PortError, StockOracle};

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Product not found.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Client for the storefront stock and catalog endpoints.
///
/// Cheaply cloneable; the underlying connection pool and product cache are
/// shared between clones.
#[derive(Clone)]
pub struct StorefrontApiClient {
    client: reqwest::Client,
    base_url: String,
    products: Cache<ProductId, Product>,
}

impl StorefrontApiClient {
    /// Create a new storefront API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the access token
    /// is not a valid header value.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.access_token {
            let auth_value = format!("Bearer {}", token.expose_secret());
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| ApiError::Parse(format!("invalid access token: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            products,
        })
    }

    /// Fetch the stock record for a product. Stock is never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_stock(&self, product_id: ProductId) -> Result<StockRecord, ApiError> {
        let url = format!("{}/stock/{product_id}", self.base_url);
        self.get_json(&url, product_id).await
    }

    /// Fetch catalog metadata for a product, cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.products.get(&product_id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = format!("{}/products/{product_id}", self.base_url);
        let product: Product = self.get_json(&url, product_id).await?;

        self.products.insert(product_id, product.clone()).await;

        Ok(product)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        product_id: ProductId,
    ) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(product_id));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, product_id: ProductId) {
        self.products.invalidate(&product_id).await;
    }

    /// Invalidate all cached products.
    pub async fn invalidate_all(&self) {
        self.products.invalidate_all();
        self.products.run_pending_tasks().await;
    }
}

impl From<ApiError> for PortError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(product_id) => Self::NotFound(product_id),
            other => Self::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl StockOracle for StorefrontApiClient {
    async fn stock(&self, product_id: ProductId) -> Result<StockRecord, PortError> {
        Ok(self.get_stock(product_id).await?)
    }
}

#[async_trait]
impl Catalog for StorefrontApiClient {
    async fn product(&self, product_id: ProductId) -> Result<Product, PortError> {
        Ok(self.get_product(product_id).await?)
    }
}
