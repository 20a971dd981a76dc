use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;
use crate::errors::StorefrontError;

/// The backend's `{success, data, message}` response envelope.
///
/// Every route wraps its payload in this shape; `success == false` with a
/// 2xx status is how the backend reports business-rule rejections that are
/// not protocol errors.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload, turning an unsuccessful envelope into a
    /// [`StorefrontError::ServerRejected`] carrying the backend's message.
    pub fn into_data(self, operation: &str) -> Result<T, StorefrontError> {
        if !self.success {
            return Err(StorefrontError::ServerRejected(
                self.message
                    .unwrap_or_else(|| format!("The store could not {}.", operation)),
            ));
        }
        self.data.ok_or_else(|| {
            StorefrontError::ServerRejected(format!(
                "The store returned no data for {}.",
                operation
            ))
        })
    }
}

/// Authenticated JSON client for the remote storefront REST API.
///
/// Owns the transport configuration (timeout, TLS) and the bearer token;
/// services hold it behind an `Arc` and never construct requests
/// themselves. Timeouts live here — callers do not implement their own.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Builds a client from configuration with a default transport.
    pub fn new(config: &StorefrontConfig) -> Result<Self, StorefrontError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(StorefrontError::Network)?;

        Self::with_http(http, &config.api_base_url, config.api_token.clone())
    }

    /// Builds a client from an existing transport (useful for testing).
    pub fn with_http(
        http: Client,
        base_url: &str,
        token: Option<String>,
    ) -> Result<Self, StorefrontError> {
        // A trailing slash keeps Url::join from replacing the last path
        // segment of the API prefix.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| StorefrontError::Configuration(format!("invalid api_base_url: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Whether a bearer token is attached to outgoing requests.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, StorefrontError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| StorefrontError::Configuration(format!("invalid request path: {}", e)))
    }

    #[instrument(skip(self, query, body))]
    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<&B>,
    ) -> Result<Envelope<T>, StorefrontError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(pairs) = query {
            request = request.query(pairs);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::rejection(status, &text));
        }

        debug!(status = %status, "api call succeeded");
        Ok(serde_json::from_str(&text)?)
    }

    /// Maps a non-2xx response into the error taxonomy, preferring the
    /// backend's own message when the body carries an envelope.
    fn rejection(status: StatusCode, body: &str) -> StorefrontError {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| "An error occurred".to_string());

        StorefrontError::from_status(status, message)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Envelope<T>, StorefrontError> {
        self.execute::<T, ()>(Method::GET, path, None, None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Envelope<T>, StorefrontError> {
        self.execute::<T, ()>(Method::GET, path, Some(query), None)
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, StorefrontError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, None, Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, StorefrontError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, None, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Envelope<T>, StorefrontError> {
        self.execute::<T, ()>(Method::DELETE, path, None, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_data_unwraps_successful_envelope() {
        let envelope = Envelope {
            success: true,
            data: Some(41),
            message: None,
        };
        assert_eq!(envelope.into_data("fetch the cart").unwrap(), 41);
    }

    #[test]
    fn into_data_surfaces_backend_message() {
        let envelope: Envelope<i32> = Envelope {
            success: false,
            data: None,
            message: Some("Coupon has expired.".into()),
        };
        match envelope.into_data("validate the coupon") {
            Err(StorefrontError::ServerRejected(msg)) => assert_eq!(msg, "Coupon has expired."),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn into_data_rejects_missing_payload() {
        let envelope: Envelope<i32> = Envelope {
            success: true,
            data: None,
            message: None,
        };
        assert!(envelope.into_data("fetch the cart").is_err());
    }

    #[test]
    fn endpoint_joins_against_api_prefix() {
        let client = ApiClient::with_http(
            Client::new(),
            "https://api.example.test/api",
            None,
        )
        .expect("client builds");

        let url = client.endpoint("/cart/items").expect("joins");
        assert_eq!(url.as_str(), "https://api.example.test/api/cart/items");

        let url = client.endpoint("coupons/validate").expect("joins");
        assert_eq!(url.as_str(), "https://api.example.test/api/coupons/validate");
    }

    #[test]
    fn blank_token_means_anonymous() {
        let client =
            ApiClient::with_http(Client::new(), "https://api.example.test/api", Some("  ".into()))
                .expect("client builds");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn rejection_prefers_backend_message() {
        let err = ApiClient::rejection(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "message": "Quantity must be positive"}"#,
        );
        assert_eq!(err.user_message(), "Quantity must be positive");
    }

    #[test]
    fn rejection_falls_back_on_unparseable_body() {
        let err = ApiClient::rejection(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, StorefrontError::ServerRejected(_)));
        assert_eq!(err.user_message(), "An error occurred");
    }
}
