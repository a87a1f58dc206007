//! REST client for the marketplace API.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ArtDetails, ArtRepository, AuthRepository, ClientError, ClientResult, Credentials,
    DeeplinkAuthResult, FeedPage, FeedQuery, TokenId, UploadArt, User, UserRepository,
};

const AUTH_CHANNEL: &str = "web3auth";

#[derive(Debug, PartialEq, Serialize)]
struct SignInRequest {
    channel: &'static str,
    token: String,
    address: String,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    credentials: Credentials,
    user: User,
}

#[derive(Serialize)]
struct LikeRequest {
    liked: bool,
}

/// Client for the marketplace REST API.
///
/// Holds the bearer token of the current session. The token is installed by
/// a successful sign-in or sign-up and dropped by sign-out.
pub struct HttpApi {
    client: Client,
    base_url: Url,
    access_token: RwLock<Option<String>>,
}

impl HttpApi {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root; endpoint paths are resolved below it, with or
    ///   without a trailing slash
    /// * `access_token` - Token of a session restored from preferences
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` when `base_url` is not an absolute URL.
    pub fn new(base_url: &str, access_token: Option<String>) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid API base URL {base_url}: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            access_token: RwLock::new(access_token),
        })
    }

    pub fn set_access_token(&self, token: Option<String>) {
        let mut slot = self.access_token.write().unwrap_or_else(|e| e.into_inner());
        *slot = token;
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("invalid endpoint {path}: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token.read().unwrap_or_else(|e| e.into_inner()).clone();
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::api(status.as_u16(), message))
    }

    async fn exchange(&self, path: &str, raw_payload: &str) -> ClientResult<(Credentials, User)> {
        let request = sign_in_request(raw_payload)?;
        let response = self
            .send(self.client.post(self.endpoint(path)?).json(&request))
            .await?;
        let SignInResponse { credentials, user } = response.json().await?;
        self.set_access_token(Some(credentials.access_token.clone()));
        Ok((credentials, user))
    }
}

fn feed_params(query: &FeedQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(cursor) = &query.cursor {
        params.push(("start_after", cursor.clone()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(tags) = &query.tags {
        params.push(("tags", tags.clone()));
    }
    params
}

fn sign_in_request(raw_payload: &str) -> ClientResult<SignInRequest> {
    let result: DeeplinkAuthResult = serde_json::from_str(raw_payload)?;
    if result.id_token.trim().is_empty() {
        return Err(ClientError::InvalidPayload("idToken is empty".to_string()));
    }
    Ok(SignInRequest {
        channel: AUTH_CHANNEL,
        token: result.id_token,
        address: result.address,
    })
}

#[async_trait]
impl ArtRepository for HttpApi {
    async fn get_art_feed(&self, query: FeedQuery) -> ClientResult<FeedPage> {
        let request = self
            .client
            .get(self.endpoint("art/v1")?)
            .query(&feed_params(&query));
        Ok(self.send(request).await?.json().await?)
    }

    async fn get_art_details(&self, token_id: TokenId) -> ClientResult<ArtDetails> {
        let request = self
            .client
            .get(self.endpoint(&format!("art/v1/{token_id}/details"))?);
        Ok(self.send(request).await?.json().await?)
    }

    async fn put_art_like(&self, token_id: TokenId, liked: bool) -> ClientResult<()> {
        let request = self
            .client
            .put(self.endpoint(&format!("art/v1/{token_id}/like"))?)
            .json(&LikeRequest { liked });
        self.send(request).await?;
        Ok(())
    }

    async fn upload_art(&self, art: UploadArt) -> ClientResult<()> {
        let request = self.client.post(self.endpoint("art/v1")?).json(&art);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthRepository for HttpApi {
    async fn sign_in(&self, raw_payload: &str) -> ClientResult<(Credentials, User)> {
        self.exchange("auth/v1/signin", raw_payload).await
    }

    async fn sign_up(&self, raw_payload: &str) -> ClientResult<(Credentials, User)> {
        self.exchange("auth/v1/signup", raw_payload).await
    }

    fn sign_out(&self) {
        self.set_access_token(None);
    }
}

#[async_trait]
impl UserRepository for HttpApi {
    async fn get_my_profile(&self) -> ClientResult<User> {
        let request = self.client.get(self.endpoint("users/v1/me")?);
        Ok(self.send(request).await?.json().await?)
    }
}
