use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;

use super::error::NetworkError;
use super::request::{Request, Response};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The path requests take when the cache cannot answer them.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform `request`. Non-success statuses are returned as responses,
    /// only transport failures are errors.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// `Network` backed by reqwest. Relative urls resolve against `origin`.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
    origin: String,
}

impl HttpNetwork {
    pub fn new(origin: &str) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Absolute url for a request url.
    pub fn resolve(&self, url: &str) -> Result<String, NetworkError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url.to_string())
        } else if url.starts_with('/') {
            Ok(format!("{}{}", self.origin, url))
        } else {
            Err(NetworkError::InvalidUrl(url.to_string()))
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let url = self.resolve(&request.url)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| NetworkError::InvalidUrl(format!("bad method {}", request.method)))?;

        let response = self.client.request(method, &url).send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        debug!(url = %url, status, bytes = body.len(), "Fetched from network");
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_resolve() {
        let network = HttpNetwork::new("https://recipes.example/").unwrap();
        assert_eq!(
            network.resolve("/style.css").unwrap(),
            "https://recipes.example/style.css"
        );
        assert_eq!(
            network.resolve("https://cdn.example/x.js").unwrap(),
            "https://cdn.example/x.js"
        );
        assert!(network.resolve("style.css").is_err());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/style.css")
            .with_status(200)
            .with_header("content-type", "text/css")
            .with_body("body { margin: 0 }")
            .create_async()
            .await;

        let network = HttpNetwork::new(&server.url()).unwrap();
        let response = network.fetch(&Request::get("/style.css")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("text/css"));
        assert_eq!(response.body, b"body { margin: 0 }");
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_a_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.js")
            .with_status(404)
            .create_async()
            .await;

        let network = HttpNetwork::new(&server.url()).unwrap();
        let response = network.fetch(&Request::get("/missing.js")).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }
}
