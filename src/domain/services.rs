//! Repository ports and the use cases built on top of them.
//!
//! Repositories are the seams to the outside world (REST API, preference
//! file). Use cases add the little behaviour the flows share, such as storing
//! credentials after a successful sign-in.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::ClientResult;
use super::models::{ArtDetails, Credentials, FeedPage, FeedQuery, TokenId, UploadArt, User};

/// Access to the artwork endpoints of the marketplace API.
#[async_trait]
pub trait ArtRepository: Send + Sync {
    /// Fetches one page of the explore feed.
    ///
    /// # Arguments
    ///
    /// * `query` - Cursor, page size and tags; `None` fields are not sent
    async fn get_art_feed(&self, query: FeedQuery) -> ClientResult<FeedPage>;

    /// Fetches the full record of one artwork.
    async fn get_art_details(&self, token_id: TokenId) -> ClientResult<ArtDetails>;

    /// Stores the like flag of the signed-in user for `token_id`.
    async fn put_art_like(&self, token_id: TokenId, liked: bool) -> ClientResult<()>;

    /// Registers a minted artwork with the backend.
    async fn upload_art(&self, art: UploadArt) -> ClientResult<()>;
}

/// Exchanges a raw redirect payload for credentials.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Signs in an existing account.
    ///
    /// # Arguments
    ///
    /// * `raw_payload` - The undecoded payload of the auth page redirect
    async fn sign_in(&self, raw_payload: &str) -> ClientResult<(Credentials, User)>;

    /// Creates an account for a wallet the backend has not seen yet.
    async fn sign_up(&self, raw_payload: &str) -> ClientResult<(Credentials, User)>;

    /// Drops any credentials the transport is holding on to.
    fn sign_out(&self) {}
}

/// Profile of the signed-in account.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_my_profile(&self) -> ClientResult<User>;
}

/// Small key/value store that survives restarts.
pub trait PreferencesRepository: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;

    fn set_credentials(&self, credentials: &Credentials) -> ClientResult<()>;

    fn clear_credentials(&self) -> ClientResult<()>;
}

/// Authentication use cases: sign in, sign up, sign out and the
/// "am I signed in" check.
///
/// The stored credentials are the single source of truth for whether the
/// user is signed in.
#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthRepository>,
    preferences: Arc<dyn PreferencesRepository>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthRepository>, preferences: Arc<dyn PreferencesRepository>) -> Self {
        Self { auth, preferences }
    }

    /// Returns true when credentials are stored.
    pub fn check_authenticate_state(&self) -> bool {
        self.preferences.credentials().is_some()
    }

    /// Signs in and stores the returned credentials.
    ///
    /// # Arguments
    ///
    /// * `raw_payload` - The undecoded payload of the auth page redirect
    ///
    /// # Errors
    ///
    /// Returns the repository error when the exchange fails, or
    /// `ClientError::Storage` when the credentials could not be stored. In
    /// the latter case the session the transport picked up is dropped again,
    /// so the client never holds a token it does not remember.
    pub async fn sign_in(&self, raw_payload: &str) -> ClientResult<(Credentials, User)> {
        let session = self.auth.sign_in(raw_payload).await?;
        self.remember(session)
    }

    /// Signs up and stores the returned credentials.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::sign_in`].
    pub async fn sign_up(&self, raw_payload: &str) -> ClientResult<(Credentials, User)> {
        let session = self.auth.sign_up(raw_payload).await?;
        self.remember(session)
    }

    fn remember(&self, session: (Credentials, User)) -> ClientResult<(Credentials, User)> {
        if let Err(err) = self.preferences.set_credentials(&session.0) {
            self.auth.sign_out();
            return Err(err);
        }
        Ok(session)
    }

    /// Forgets the session both in the transport and on disk.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` when the preference store cannot be
    /// written.
    pub fn sign_out(&self) -> ClientResult<()> {
        self.auth.sign_out();
        self.preferences.clear_credentials()
    }
}

#[derive(Clone)]
pub struct GetArtFeed {
    repository: Arc<dyn ArtRepository>,
}

impl GetArtFeed {
    pub fn new(repository: Arc<dyn ArtRepository>) -> Self {
        Self { repository }
    }

    pub async fn call(&self, query: FeedQuery) -> ClientResult<FeedPage> {
        self.repository.get_art_feed(query).await
    }
}

#[derive(Clone)]
pub struct GetArtDetails {
    repository: Arc<dyn ArtRepository>,
}

impl GetArtDetails {
    pub fn new(repository: Arc<dyn ArtRepository>) -> Self {
        Self { repository }
    }

    pub async fn call(&self, token_id: TokenId) -> ClientResult<ArtDetails> {
        self.repository.get_art_details(token_id).await
    }
}

/// Persists a like toggle. The feed applies the toggle optimistically and
/// never rolls it back, so callers only get to observe the outcome.
#[derive(Clone)]
pub struct LikeArt {
    repository: Arc<dyn ArtRepository>,
}

impl LikeArt {
    pub fn new(repository: Arc<dyn ArtRepository>) -> Self {
        Self { repository }
    }

    /// # Errors
    ///
    /// Whatever the repository reports; nothing is retried.
    pub async fn try_persist(&self, token_id: TokenId, liked: bool) -> ClientResult<()> {
        self.repository.put_art_like(token_id, liked).await
    }
}

#[derive(Clone)]
pub struct UploadArtwork {
    repository: Arc<dyn ArtRepository>,
}

impl UploadArtwork {
    pub fn new(repository: Arc<dyn ArtRepository>) -> Self {
        Self { repository }
    }

    pub async fn call(&self, art: UploadArt) -> ClientResult<()> {
        self.repository.upload_art(art).await
    }
}

#[derive(Clone)]
pub struct GetMyProfile {
    repository: Arc<dyn UserRepository>,
}

impl GetMyProfile {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn call(&self) -> ClientResult<User> {
        self.repository.get_my_profile().await
    }
}
