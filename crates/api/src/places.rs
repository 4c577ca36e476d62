use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Client for the external place/geocoding provider.
///
/// Request and response shapes pass through largely unchanged, so the
/// payloads stay as raw JSON values; only the routing and error handling
/// are owned here.
pub struct PlacesClient<T> {
    transport: T,
}

impl<T: Transport> PlacesClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn autocomplete(&self, input: &str) -> Result<Value, ApiError> {
        self.send(HttpRequest::get("/places/autocomplete").with_query("input", input))
            .await
    }

    pub async fn place_details(&self, place_id: &str) -> Result<Value, ApiError> {
        self.send(HttpRequest::get("/places/details").with_query("placeId", place_id))
            .await
    }

    pub async fn nearby_search(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<Value, ApiError> {
        self.send(
            HttpRequest::get("/places/nearby")
                .with_query("latitude", latitude)
                .with_query("longitude", longitude)
                .with_query("radius", radius_m),
        )
        .await
    }

    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Value, ApiError> {
        self.send(
            HttpRequest::get("/places/reverse-geocode")
                .with_query("latitude", latitude)
                .with_query("longitude", longitude),
        )
        .await
    }

    async fn send(&self, request: HttpRequest) -> Result<Value, ApiError> {
        debug!(path = %request.path, "places request");
        let response: HttpResponse = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Transport(e.0))?;
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: crate::error::status_text(response.status).to_string(),
            });
        }
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::{Value, json};

    use super::PlacesClient;
    use crate::error::ApiError;
    use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

    struct Scripted {
        responses: RefCell<VecDeque<HttpResponse>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Transport for &Scripted {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| TransportError("script exhausted".to_string()))
        }
    }

    #[tokio::test]
    async fn payloads_pass_through_unchanged() {
        let provider_body = json!({ "predictions": [{ "description": "Blue Bottle" }] });
        let transport = Scripted {
            responses: RefCell::new(
                vec![HttpResponse {
                    status: 200,
                    body: provider_body.clone(),
                }]
                .into(),
            ),
            seen: RefCell::new(Vec::new()),
        };

        let client = PlacesClient::new(&transport);
        let got = client.autocomplete("blue bo").await.unwrap();
        assert_eq!(got, provider_body);

        let reqs = transport.seen.borrow();
        assert_eq!(reqs[0].path, "/places/autocomplete");
    }

    #[tokio::test]
    async fn provider_failures_become_http_errors() {
        let transport = Scripted {
            responses: RefCell::new(
                vec![HttpResponse {
                    status: 503,
                    body: Value::Null,
                }]
                .into(),
            ),
            seen: RefCell::new(Vec::new()),
        };

        let client = PlacesClient::new(&transport);
        let err = client.reverse_geocode(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503, .. }));
    }
}
