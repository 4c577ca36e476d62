use serde_json::Value;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outbound HTTP exchange, transport-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            bearer: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport failure before any response was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// Abstract request sender.
///
/// The client never touches a socket directly; tests implement this with
/// scripted exchanges, production uses [`ReqwestTransport`].
pub trait Transport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use serde_json::Value;

    use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};

    /// Production transport over `reqwest` with rustls.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
        base_url: String,
    }

    impl ReqwestTransport {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                http: reqwest::Client::new(),
                base_url: base_url.into(),
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }
    }

    impl Transport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                request.path.trim_start_matches('/')
            );

            let mut builder = match request.method {
                Method::Get => self.http.get(&url),
                Method::Post => self.http.post(&url),
            };
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError(e.to_string()))?;
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .map_err(|e| TransportError(e.to_string()))?;

            // Empty and non-JSON bodies are represented as null; the decode
            // layer decides whether that is acceptable.
            let body = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(Value::Null)
            };

            Ok(HttpResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpRequest, HttpResponse, Method};
    use serde_json::json;

    #[test]
    fn request_builders_compose() {
        let req = HttpRequest::get("/pins/nearby")
            .with_query("latitude", 1.5)
            .with_query("limit", 100)
            .with_bearer("tok");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.bearer.as_deref(), Some("tok"));

        let req = HttpRequest::post("/auth/login", json!({"email": "a@b.c"}));
        assert!(req.body.is_some());
    }

    #[test]
    fn success_covers_the_2xx_range() {
        let ok = HttpResponse {
            status: 204,
            body: serde_json::Value::Null,
        };
        assert!(ok.is_success());
        let not = HttpResponse {
            status: 301,
            body: serde_json::Value::Null,
        };
        assert!(!not.is_success());
    }
}
