use chrono::{DateTime, Utc};

/// An outgoing resource request, identified by method and url.
///
/// Urls are compared exactly as given: `/style.css` and
/// `https://host/style.css` are different requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    pub method: String,
    pub url: String,
}

impl Request {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    /// Lookup key combining method and url.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as held by a cache, with the time it was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub request: Request,
    pub response: Response,
    pub cached_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_method_normalized() {
        let req = Request::new("get", "/index.html");
        assert_eq!(req.method, "GET");
        assert_eq!(req, Request::get("/index.html"));
        assert_eq!(req.cache_key(), "GET /index.html");
    }

    #[test]
    fn test_response_status_and_headers() {
        let resp = Response::new(200, "body").with_header("Content-Type", "text/css");
        assert!(resp.is_success());
        assert_eq!(resp.header("content-type"), Some("text/css"));
        assert!(!Response::new(404, "").is_success());
        assert!(!Response::new(302, "").is_success());
    }
}
