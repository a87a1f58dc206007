use serde::{Deserialize, Serialize};

pub type TokenId = i64;

/// Wallet/profile summary of whoever currently owns an artwork.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i64,
    #[serde(default, alias = "email")]
    pub nickname: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub address: String,
}

/// A single artwork as rendered in the explore feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtItem {
    pub token_id: TokenId,
    pub image_url: String,
    #[serde(default)]
    pub liked: bool,
    /// Zero means the artwork is open source (free to use).
    #[serde(default)]
    pub price_in_flow: f64,
    #[serde(default)]
    pub royalty_fee: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: Owner,
}

impl ArtItem {
    pub fn is_open_source(&self) -> bool {
        self.price_in_flow == 0.0
    }
}

/// Full record of one artwork, shown on the detail screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtDetails {
    pub token_id: TokenId,
    pub image_url: String,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub for_sale: bool,
    #[serde(default)]
    pub price_in_flow: f64,
    #[serde(default)]
    pub royalty_fee: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: Owner,
    /// Generation recipe; hidden by the backend for paid artworks the
    /// viewer does not own.
    #[serde(default)]
    pub recipe: Option<Recipe>,
}

impl ArtDetails {
    pub fn is_open_source(&self) -> bool {
        self.price_in_flow == 0.0
    }
}

/// One page of the art feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub has_next: bool,
    pub results: Vec<ArtItem>,
    #[serde(default)]
    pub total: u64,
    /// Opaque cursor, handed back verbatim to fetch the following page.
    #[serde(rename = "nextStartAfter", default)]
    pub next_cursor: Option<String>,
}

/// Parameters of a feed request. `None` fields are left off the query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

/// Account profile, as returned by sign-in and the "my profile" endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub art_count: u32,
    #[serde(default)]
    pub following_count: u32,
    #[serde(default)]
    pub follower_count: u32,
}

/// Result of the external wallet auth page, delivered as the redirect payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeeplinkAuthResult {
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub address: String,
}

/// Prompt and generation parameters used to produce an artwork.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub model_name: String,
    pub prompt: String,
    pub size_width: u32,
    pub size_height: u32,
    pub negative_prompt: Option<String>,
    pub guidance_scale: Option<u32>,
    pub runs: Option<u32>,
    pub sampler: Option<String>,
    pub seed: Option<i64>,
    pub parent_token_id: Option<TokenId>,
}

/// Everything the backend needs to register a minted artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadArt {
    pub for_sale: bool,
    pub image_url: String,
    pub description: Option<String>,
    pub price_in_flow: f64,
    pub royalty_fee: u32,
    pub is_imported: bool,
    #[serde(flatten)]
    pub recipe: Recipe,
    /// Opaque confirmation returned by the external mint page.
    pub mint_confirmation: String,
}
