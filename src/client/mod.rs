use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Errors surfaced by the API client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; the body is the server's plain-text error message
    #[error("{status}: {message}")]
    Api { status: u16, message: String },
}

/// Thin HTTP client for the catalog API. Holds the base URL and an optional
/// bearer token; mutating endpoints reject without one.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        // A trailing slash keeps Url::join from eating the last path segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|_| ClientError::InvalidBaseUrl(normalized))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|_| ClientError::InvalidBaseUrl(path.to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    pub async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url(path)?)).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.send(self.http.post(self.url(path)?).json(body)).await
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        self.send(self.http.patch(self.url(path)?).json(body)).await
    }

    pub async fn delete_json(&self, path: &str) -> Result<Value, ClientError> {
        self.send(self.http.delete(self.url(path)?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_against_the_base() {
        let client = ApiClient::new("http://localhost:3000", None).unwrap();
        let url = client.url("api/stores").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/stores");

        // Trailing slash in the configured base is tolerated
        let client = ApiClient::new("http://localhost:3000/", None).unwrap();
        let url = client.url("api/abc/genders").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/abc/genders");
    }

    #[test]
    fn rejects_garbage_base_urls() {
        assert!(ApiClient::new("not a url", None).is_err());
    }
}
