use mapview::controller::NearbyQuery;
use mapview::points::GeoPoint;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{ApiError, status_text};
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::types::{
    AuthResponse, AuthTokens, CreatePinRequest, CreatePinResponse, FeedPage, MeInclude,
    MeResponse, PinDetail, RegisterRequest, ValidateEmailResponse,
};

/// Client for the place-pinning backend.
///
/// Holds the session tokens in memory; persisting them across restarts is
/// the host's job (a `storage::PersistedSlot` over `keys::AUTH_TOKENS`).
///
/// Authenticated sends attach the bearer access token. A 401 triggers
/// exactly one transparent refresh-and-retry; if the refresh itself is
/// rejected the local session is cleared and the caller gets
/// `ApiError::SessionExpired` (the host's route guard redirects to login).
pub struct ApiClient<T> {
    transport: T,
    tokens: Option<AuthTokens>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tokens: None,
        }
    }

    /// Restore a persisted session.
    pub fn with_tokens(transport: T, tokens: AuthTokens) -> Self {
        Self {
            transport,
            tokens: Some(tokens),
        }
    }

    pub fn tokens(&self) -> Option<&AuthTokens> {
        self.tokens.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn clear_session(&mut self) {
        self.tokens = None;
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = HttpRequest::post(
            "/auth/login",
            json!({ "email": email, "password": password }),
        );
        let resp: AuthResponse = decode(self.send(req).await?)?;
        self.tokens = Some(AuthTokens {
            access_token: resp.access_token.clone(),
            refresh_token: resp.refresh_token.clone(),
        });
        Ok(resp)
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let resp: AuthResponse = decode(self.send(HttpRequest::post("/auth/register", body)).await?)?;
        self.tokens = Some(AuthTokens {
            access_token: resp.access_token.clone(),
            refresh_token: resp.refresh_token.clone(),
        });
        Ok(resp)
    }

    pub async fn validate_email(&self, email: &str) -> Result<ValidateEmailResponse, ApiError> {
        let req = HttpRequest::post("/auth/validate-email", json!({ "email": email }));
        decode(self.send(req).await?)
    }

    pub async fn me(&mut self, include: MeInclude) -> Result<MeResponse, ApiError> {
        let mut req = HttpRequest::get("/auth/me");
        if include.pins {
            req = req.with_query("pins", "true");
        }
        if include.collections {
            req = req.with_query("collections", "true");
        }
        if include.visit_count {
            req = req.with_query("visitCount", "true");
        }
        if include.wishlist_count {
            req = req.with_query("wishlistCount", "true");
        }
        decode(self.send_authed(req).await?)
    }

    pub async fn create_pin(
        &mut self,
        request: &CreatePinRequest,
    ) -> Result<CreatePinResponse, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        decode(self.send_authed(HttpRequest::post("/pins", body)).await?)
    }

    /// Fetch points near a coordinate. The caller keeps the query's `seq`
    /// and applies the result through its `PointSet`, which is what
    /// discards out-of-order completions.
    pub async fn nearby_pins(&mut self, query: &NearbyQuery) -> Result<Vec<GeoPoint>, ApiError> {
        let req = HttpRequest::get("/pins/nearby")
            .with_query("latitude", query.center.latitude)
            .with_query("longitude", query.center.longitude)
            .with_query("radius", query.radius_m)
            .with_query("limit", query.limit);
        decode(self.send_authed(req).await?)
    }

    pub async fn pin_detail(&mut self, id: &str) -> Result<PinDetail, ApiError> {
        decode(self.send_authed(HttpRequest::get(format!("/pins/{id}"))).await?)
    }

    pub async fn feed(&mut self, limit: u64, offset: u64) -> Result<FeedPage, ApiError> {
        let req = HttpRequest::get("/feed")
            .with_query("limit", limit)
            .with_query("offset", offset);
        decode(self.send_authed(req).await?)
    }

    /// Exchange the refresh token for fresh tokens.
    ///
    /// A rejected refresh clears the session (the tokens are dead); a
    /// transport failure leaves it alone so a later attempt can succeed.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let refresh_token = match &self.tokens {
            Some(t) => t.refresh_token.clone(),
            None => return Err(ApiError::SessionExpired),
        };

        let req = HttpRequest::post("/auth/refresh", json!({ "refreshToken": refresh_token }));
        let resp = self.send(req).await?;
        if !resp.is_success() {
            warn!(status = resp.status, "token refresh rejected, clearing session");
            self.tokens = None;
            return Err(ApiError::SessionExpired);
        }

        let tokens: AuthTokens = decode(resp)?;
        self.tokens = Some(tokens);
        Ok(())
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(path = %request.path, "api request");
        self.transport
            .send(request)
            .await
            .map_err(|e| ApiError::Transport(e.0))
    }

    async fn send_authed(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let access = match &self.tokens {
            Some(t) => t.access_token.clone(),
            None => return Err(ApiError::SessionExpired),
        };

        let first = self.send(request.clone().with_bearer(access)).await?;
        if first.status != 401 {
            return Ok(first);
        }

        debug!(path = %request.path, "access token rejected, attempting refresh");
        self.refresh().await?;

        // Retried exactly once with the new token; whatever comes back is
        // the caller's answer, even another failure.
        let access = match &self.tokens {
            Some(t) => t.access_token.clone(),
            None => return Err(ApiError::SessionExpired),
        };
        self.send(request.with_bearer(access)).await
    }
}

fn decode<D: DeserializeOwned>(response: HttpResponse) -> Result<D, ApiError> {
    if !response.is_success() {
        return Err(http_error(response));
    }
    serde_json::from_value(response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn http_error(response: HttpResponse) -> ApiError {
    let message = response
        .body
        .get("message")
        .or_else(|| response.body.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| status_text(response.status).to_string());
    ApiError::Http {
        status: response.status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::ApiClient;
    use crate::error::ApiError;
    use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
    use crate::types::{AuthTokens, MeInclude};
    use mapview::controller::NearbyQuery;

    /// Transport that replays a script of canned responses and records
    /// every request it saw.
    struct Scripted {
        responses: RefCell<VecDeque<HttpResponse>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.borrow().clone()
        }
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

    fn ok(body: Value) -> HttpResponse {
        HttpResponse { status: 200, body }
    }

    fn status(code: u16, body: Value) -> HttpResponse {
        HttpResponse { status: code, body }
    }

    fn tokens(access: &str, refresh: &str) -> AuthTokens {
        AuthTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    fn user_json() -> Value {
        json!({ "id": "u1", "email": "ada@example.com", "username": "ada" })
    }

    #[tokio::test]
    async fn login_stores_the_session_tokens() {
        let transport = Scripted::new(vec![ok(json!({
            "user": user_json(),
            "accessToken": "a1",
            "refreshToken": "r1",
        }))]);
        let mut client = ApiClient::new(&transport);

        let resp = client.login("ada@example.com", "pw").await.unwrap();
        assert_eq!(resp.user.username, "ada");
        assert_eq!(client.tokens().unwrap(), &tokens("a1", "r1"));
    }

    #[tokio::test]
    async fn authed_requests_attach_the_bearer_token() {
        let transport = Scripted::new(vec![ok(user_json())]);
        let mut client = ApiClient::with_tokens(&transport, tokens("a1", "r1"));

        client.me(MeInclude::default()).await.unwrap();
        let reqs = transport.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].bearer.as_deref(), Some("a1"));
    }

    #[tokio::test]
    async fn a_401_triggers_exactly_one_refresh_and_retry() {
        let transport = Scripted::new(vec![
            status(401, Value::Null),
            ok(json!({ "accessToken": "a2", "refreshToken": "r2" })),
            ok(user_json()),
        ]);
        let mut client = ApiClient::with_tokens(&transport, tokens("a1", "r1"));

        let me = client.me(MeInclude::default()).await.unwrap();
        assert_eq!(me.user.id, "u1");

        let reqs = transport.requests();
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[0].bearer.as_deref(), Some("a1"));
        assert_eq!(reqs[1].path, "/auth/refresh");
        assert_eq!(reqs[2].bearer.as_deref(), Some("a2"));
        assert_eq!(client.tokens().unwrap(), &tokens("a2", "r2"));
    }

    #[tokio::test]
    async fn a_failed_refresh_clears_the_session() {
        let transport = Scripted::new(vec![
            status(401, Value::Null),
            status(401, json!({ "message": "refresh token revoked" })),
        ]);
        let mut client = ApiClient::with_tokens(&transport, tokens("a1", "r1"));

        let err = client.me(MeInclude::default()).await.unwrap_err();
        assert_eq!(err, ApiError::SessionExpired);
        assert!(!client.is_authenticated());
        // No retry happened after the failed refresh.
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn the_retry_result_is_returned_even_when_it_fails() {
        let transport = Scripted::new(vec![
            status(401, Value::Null),
            ok(json!({ "accessToken": "a2", "refreshToken": "r2" })),
            status(403, json!({ "message": "account suspended" })),
        ]);
        let mut client = ApiClient::with_tokens(&transport, tokens("a1", "r1"));

        let err = client.me(MeInclude::default()).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 403,
                message: "account suspended".to_string(),
            }
        );
        // One refresh only; a second 4xx does not loop.
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn server_message_is_preferred_over_status_text() {
        let transport = Scripted::new(vec![status(404, json!({ "error": "pin not found" }))]);
        let mut client = ApiClient::with_tokens(&transport, tokens("a1", "r1"));

        let err = client.pin_detail("p9").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 404,
                message: "pin not found".to_string(),
            }
        );

        let transport = Scripted::new(vec![status(500, Value::Null)]);
        let mut client = ApiClient::with_tokens(&transport, tokens("a1", "r1"));
        let err = client.pin_detail("p9").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 500,
                message: "Internal Server Error".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn nearby_pins_sends_the_query_parameters() {
        let transport = Scripted::new(vec![ok(json!([
            { "id": "p1", "latitude": 1.0, "longitude": 2.0 }
        ]))]);
        let mut client = ApiClient::with_tokens(&transport, tokens("a1", "r1"));

        let query = NearbyQuery {
            seq: 7,
            center: mapview::LatLon::new(1.0, 2.0),
            radius_m: 2775.0,
            limit: 100,
        };
        let points = client.nearby_pins(&query).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, "p1");

        let reqs = transport.requests();
        assert_eq!(reqs[0].path, "/pins/nearby");
        assert!(reqs[0].query.iter().any(|(k, v)| k == "limit" && v == "100"));
    }

    #[tokio::test]
    async fn unauthenticated_calls_fail_fast() {
        let transport = Scripted::new(vec![]);
        let mut client = ApiClient::new(&transport);
        let err = client.me(MeInclude::default()).await.unwrap_err();
        assert_eq!(err, ApiError::SessionExpired);
        assert!(transport.requests().is_empty());
    }
}
