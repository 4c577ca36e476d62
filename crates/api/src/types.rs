use serde::{Deserialize, Serialize};

// Wire DTOs. Field names follow the backend's camelCase convention.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateEmailResponse {
    pub ok: bool,
    #[serde(default)]
    pub action: Option<String>,
}

/// Optional expansions for `GET /auth/me`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeInclude {
    pub pins: bool,
    pub collections: bool,
    pub visit_count: bool,
    pub wishlist_count: bool,
}

impl MeInclude {
    pub fn everything() -> Self {
        Self {
            pins: true,
            collections: true,
            visit_count: true,
            wishlist_count: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    #[serde(default)]
    pub pins: Option<Vec<PinSummary>>,
    #[serde(default)]
    pub collections: Option<Vec<CollectionSummary>>,
    #[serde(default)]
    pub visit_count: Option<u64>,
    #[serde(default)]
    pub wishlist_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pin_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinRequest {
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub must_knows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinResponse {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MustKnow {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDetail {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub must_knows: Vec<MustKnow>,
    #[serde(default)]
    pub author: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    /// "pin_created", "visit", ... — new kinds may appear server-side.
    pub kind: String,
    pub user: UserProfile,
    #[serde(default)]
    pub pin: Option<PinSummary>,
    #[serde(default)]
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}
