//! In-memory repositories for view model tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    ArtDetails, ArtItem, ArtRepository, AuthRepository, ClientError, ClientResult, Credentials,
    FeedPage, FeedQuery, Owner, PreferencesRepository, Recipe, TokenId, UploadArt, User,
    UserRepository,
};

pub fn art_item(token_id: TokenId, liked: bool) -> ArtItem {
    ArtItem {
        token_id,
        image_url: format!("https://img.duckee.xyz/{token_id}.png"),
        liked,
        price_in_flow: if token_id % 2 == 0 { 1.5 } else { 0.0 },
        royalty_fee: 5.0,
        description: None,
        owner: Owner {
            id: 100 + token_id,
            nickname: format!("duck{token_id}"),
            profile_image: String::new(),
            address: format!("0x{token_id:04x}"),
        },
    }
}

pub fn art_details(token_id: TokenId) -> ArtDetails {
    let item = art_item(token_id, false);
    ArtDetails {
        token_id,
        image_url: item.image_url,
        liked: false,
        for_sale: true,
        price_in_flow: item.price_in_flow,
        royalty_fee: item.royalty_fee,
        description: Some(format!("duck number {token_id}")),
        owner: item.owner,
        recipe: Some(Recipe {
            model_name: "stable-diffusion-v1-5".into(),
            prompt: format!("duck number {token_id}"),
            size_width: 512,
            size_height: 512,
            ..Recipe::default()
        }),
    }
}

pub fn page(results: Vec<ArtItem>, has_next: bool, cursor: Option<&str>) -> FeedPage {
    FeedPage {
        has_next,
        total: results.len() as u64,
        results,
        next_cursor: cursor.map(str::to_string),
    }
}

#[derive(Default)]
pub struct FakeArtRepository {
    pages: Mutex<VecDeque<ClientResult<FeedPage>>>,
    queries: Mutex<Vec<FeedQuery>>,
    details: Mutex<VecDeque<ClientResult<ArtDetails>>>,
    detail_requests: Mutex<Vec<TokenId>>,
    likes: Mutex<Vec<(TokenId, bool)>>,
    like_failure: Mutex<Option<ClientError>>,
    like_delay: Mutex<Option<Duration>>,
    feed_delay: Mutex<Option<Duration>>,
    uploads: Mutex<Vec<UploadArt>>,
    upload_failure: Mutex<Option<ClientError>>,
}

impl FakeArtRepository {
    pub fn push_page(&self, page: ClientResult<FeedPage>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub fn feed_queries(&self) -> Vec<FeedQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn push_details(&self, details: ClientResult<ArtDetails>) {
        self.details.lock().unwrap().push_back(details);
    }

    pub fn detail_requests(&self) -> Vec<TokenId> {
        self.detail_requests.lock().unwrap().clone()
    }

    pub fn likes(&self) -> Vec<(TokenId, bool)> {
        self.likes.lock().unwrap().clone()
    }

    pub fn fail_likes(&self, err: ClientError) {
        *self.like_failure.lock().unwrap() = Some(err);
    }

    pub fn set_like_delay(&self, delay: Duration) {
        *self.like_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_feed_delay(&self, delay: Duration) {
        *self.feed_delay.lock().unwrap() = Some(delay);
    }

    pub fn uploads(&self) -> Vec<UploadArt> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn fail_uploads(&self, err: ClientError) {
        *self.upload_failure.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl ArtRepository for FakeArtRepository {
    async fn get_art_feed(&self, query: FeedQuery) -> ClientResult<FeedPage> {
        self.queries.lock().unwrap().push(query);
        let delay = *self.feed_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(FeedPage::default()))
    }

    async fn get_art_details(&self, token_id: TokenId) -> ClientResult<ArtDetails> {
        self.detail_requests.lock().unwrap().push(token_id);
        self.details
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api(404, "art not found")))
    }

    async fn put_art_like(&self, token_id: TokenId, liked: bool) -> ClientResult<()> {
        self.likes.lock().unwrap().push((token_id, liked));
        let delay = *self.like_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.like_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn upload_art(&self, art: UploadArt) -> ClientResult<()> {
        self.uploads.lock().unwrap().push(art);
        match self.upload_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Scripted auth backend; unscripted calls fail with a 401.
#[derive(Default)]
pub struct FakeAuthRepository {
    sign_in_results: Mutex<VecDeque<ClientResult<(Credentials, User)>>>,
    sign_up_results: Mutex<VecDeque<ClientResult<(Credentials, User)>>>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl FakeAuthRepository {
    pub fn push_sign_in(&self, result: ClientResult<(Credentials, User)>) {
        self.sign_in_results.lock().unwrap().push_back(result);
    }

    pub fn push_sign_up(&self, result: ClientResult<(Credentials, User)>) {
        self.sign_up_results.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthRepository for FakeAuthRepository {
    async fn sign_in(&self, raw_payload: &str) -> ClientResult<(Credentials, User)> {
        self.calls.lock().unwrap().push(("sign_in", raw_payload.to_string()));
        self.sign_in_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api(401, "unknown user")))
    }

    async fn sign_up(&self, raw_payload: &str) -> ClientResult<(Credentials, User)> {
        self.calls.lock().unwrap().push(("sign_up", raw_payload.to_string()));
        self.sign_up_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api(409, "sign up rejected")))
    }

    fn sign_out(&self) {
        self.calls.lock().unwrap().push(("sign_out", String::new()));
    }
}

/// Scripted profile backend; unscripted calls fail with a 401.
#[derive(Default)]
pub struct FakeUserRepository {
    profiles: Mutex<VecDeque<ClientResult<User>>>,
    requests: Mutex<usize>,
}

impl FakeUserRepository {
    pub fn push_profile(&self, profile: ClientResult<User>) {
        self.profiles.lock().unwrap().push_back(profile);
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn get_my_profile(&self) -> ClientResult<User> {
        *self.requests.lock().unwrap() += 1;
        self.profiles
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::api(401, "not signed in")))
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    credentials: Mutex<Option<Credentials>>,
    write_failure: Mutex<Option<ClientError>>,
}

impl MemoryPreferences {
    pub fn store(&self, credentials: Credentials) {
        *self.credentials.lock().unwrap() = Some(credentials);
    }

    pub fn fail_writes(&self, err: ClientError) {
        *self.write_failure.lock().unwrap() = Some(err);
    }

    fn check_write(&self) -> ClientResult<()> {
        match self.write_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl PreferencesRepository for MemoryPreferences {
    fn credentials(&self) -> Option<Credentials> {
        self.credentials.lock().unwrap().clone()
    }

    fn set_credentials(&self, credentials: &Credentials) -> ClientResult<()> {
        self.check_write()?;
        self.store(credentials.clone());
        Ok(())
    }

    fn clear_credentials(&self) -> ClientResult<()> {
        self.check_write()?;
        *self.credentials.lock().unwrap() = None;
        Ok(())
    }
}

pub fn credentials(tag: &str) -> (Credentials, User) {
    (
        Credentials {
            access_token: format!("{tag}-access"),
            refresh_token: format!("{tag}-refresh"),
        },
        User {
            id: 1,
            nickname: "duck".into(),
            address: "0xduck".into(),
            ..User::default()
        },
    )
}
