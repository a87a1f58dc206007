//! Explore feed: cursor pagination, optimistic likes, filters and
//! reload-on-resume.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use super::container::Container;
use crate::domain::{ArtItem, AuthService, FeedQuery, GetArtFeed, LikeArt, TokenId};

/// What selecting a filter does to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Only record the selection; the loaded feed is left as is.
    #[default]
    KeepFeed,
    /// Reset the feed and refetch it with the selected filter as tags.
    Reload,
}

/// Feed behaviour read from the `[feed]` config table.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Page size sent as `limit`; `None` lets the server decide.
    pub page_size: Option<u32>,
    /// Filter labels offered above the feed.
    pub filters: Vec<String>,
    pub filter_policy: FilterPolicy,
}

/// Everything the explore screen renders.
///
/// `feeds` never holds two items with the same token id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExploreState {
    pub feeds: Vec<ArtItem>,
    pub is_loading: bool,
    pub has_next: bool,
    /// Empty until the first page arrives; the next page starts here.
    pub next_cursor: String,
    pub search_value: String,
    pub selected_filter: Option<String>,
    pub filters: Vec<String>,
}

impl ExploreState {
    /// Idle state offering `filters`.
    pub fn with_filters(filters: Vec<String>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Looks up a loaded item by token id.
    pub fn find(&self, token_id: TokenId) -> Option<&ArtItem> {
        self.feeds.iter().find(|item| item.token_id == token_id)
    }
}

/// Navigation requested by the explore screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ExploreSideEffect {
    GoDetail { token_id: TokenId },
    GoSignInScreen,
}

/// Cross-screen "the feed is stale" flag, raised after an upload.
#[derive(Debug, Clone, Default)]
pub struct ExploreReloadFlag(Arc<AtomicBool>);

impl ExploreReloadFlag {
    pub fn request_reload(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_reload_pending(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn invalidate_pending_reload(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// State machine behind the explore feed.
///
/// Moves between idle, loading, loaded and exhausted: the first page sets
/// the loading flag, later pages are fetched silently from the stored cursor,
/// and once the server reports no further page scroll-end requests are
/// ignored.
pub struct ExploreViewModel {
    container: Container<ExploreState, ExploreSideEffect>,
    auth: AuthService,
    get_art_feed: GetArtFeed,
    like_art: LikeArt,
    reload: ExploreReloadFlag,
    settings: FeedSettings,
}

impl ExploreViewModel {
    pub fn new(
        auth: AuthService,
        get_art_feed: GetArtFeed,
        like_art: LikeArt,
        reload: ExploreReloadFlag,
        settings: FeedSettings,
    ) -> (Self, UnboundedReceiver<ExploreSideEffect>) {
        // Idle until `on_mount`.
        let (container, side_effects) =
            Container::new(ExploreState::with_filters(settings.filters.clone()));
        let view_model = Self {
            container,
            auth,
            get_art_feed,
            like_art,
            reload,
            settings,
        };
        (view_model, side_effects)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ExploreState {
        self.container.state()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<ExploreState> {
        self.container.subscribe()
    }

    /// Loads the first page when the screen is first shown.
    pub async fn on_mount(&self) {
        self.load_page().await;
    }

    /// Starts over from an empty feed if another screen flagged it stale.
    pub async fn on_resume(&self) {
        if !self.reload.is_reload_pending() {
            return;
        }
        tracing::debug!("explore feed invalidated, reloading");
        self.reset();
        self.load_page().await;
        self.reload.invalidate_pending_reload();
    }

    /// Stores the search box text. Does not refetch.
    pub fn on_search_value_changed(&self, value: impl Into<String>) {
        let value = value.into();
        self.container.reduce(|state| state.search_value = value);
    }

    /// Selects a filter.
    ///
    /// Under `FilterPolicy::KeepFeed` only the selection changes. Under
    /// `FilterPolicy::Reload` the feed starts over from the first page with
    /// the filter sent as tags; the search text survives the reset.
    ///
    /// # Arguments
    ///
    /// * `filter` - One of the configured filter labels
    pub async fn on_filter_click(&self, filter: impl Into<String>) {
        let filter = filter.into();
        match self.settings.filter_policy {
            FilterPolicy::KeepFeed => {
                self.container.reduce(|state| state.selected_filter = Some(filter));
            }
            FilterPolicy::Reload => {
                let initial = ExploreState::with_filters(self.settings.filters.clone());
                self.container.reduce(|state| {
                    *state = ExploreState {
                        search_value: std::mem::take(&mut state.search_value),
                        selected_filter: Some(filter),
                        ..initial
                    };
                });
                self.load_page().await;
            }
        }
    }

    /// Opens the detail of `token_id` for signed-in users and the sign-in
    /// screen for guests.
    pub fn on_image_click(&self, token_id: TokenId) {
        let effect = if self.auth.check_authenticate_state() {
            ExploreSideEffect::GoDetail { token_id }
        } else {
            ExploreSideEffect::GoSignInScreen
        };
        self.container.post_side_effect(effect);
    }

    /// Flips `liked` on the matching item right away and persists it in the
    /// background. A failed persist is logged and the local flip stays.
    ///
    /// Returns the persist task, or `None` when no item has `token_id`.
    pub fn on_like_click(&self, token_id: TokenId) -> Option<JoinHandle<()>> {
        let liked = self.container.reduce_with(|state| {
            let item = state.feeds.iter_mut().find(|item| item.token_id == token_id)?;
            item.liked = !item.liked;
            Some(item.liked)
        });
        let Some(liked) = liked else {
            tracing::debug!(token_id, "like toggle dropped, item not in feed");
            return None;
        };

        let like_art = self.like_art.clone();
        Some(tokio::spawn(async move {
            if let Err(err) = like_art.try_persist(token_id, liked).await {
                tracing::warn!(token_id, liked, error = %err, "failed to persist like");
            }
        }))
    }

    /// Fetches the next page when the user reaches the end of the list.
    ///
    /// Does nothing once the feed is exhausted (or before the first page has
    /// arrived). Requests are not de-duplicated: two calls while a page is in
    /// flight fetch the same cursor twice, and duplicate items are skipped
    /// when the page is appended.
    pub async fn on_scroll_end(&self) {
        if self.container.state().has_next {
            self.load_page().await;
        }
    }

    fn reset(&self) {
        let initial = ExploreState::with_filters(self.settings.filters.clone());
        self.container.reduce(|state| *state = initial);
    }

    async fn load_page(&self) {
        let snapshot = self.container.state();
        let first_page = snapshot.next_cursor.is_empty();
        if first_page {
            self.container.reduce(|state| state.is_loading = true);
        }

        let query = FeedQuery {
            cursor: (!first_page).then_some(snapshot.next_cursor),
            limit: self.settings.page_size,
            tags: match self.settings.filter_policy {
                FilterPolicy::Reload => snapshot.selected_filter,
                FilterPolicy::KeepFeed => None,
            },
        };

        match self.get_art_feed.call(query).await {
            Ok(page) => {
                tracing::debug!(
                    results = page.results.len(),
                    has_next = page.has_next,
                    "feed page loaded"
                );
                self.container.reduce(|state| {
                    state.is_loading = false;
                    state.has_next = page.has_next;
                    state.next_cursor = page.next_cursor.unwrap_or_default();
                    for item in page.results {
                        if state.find(item.token_id).is_some() {
                            tracing::debug!(token_id = item.token_id, "duplicate feed item skipped");
                            continue;
                        }
                        state.feeds.push(item);
                    }
                });
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load feed page");
                self.container.reduce(|state| state.is_loading = false);
            }
        }
    }
}
