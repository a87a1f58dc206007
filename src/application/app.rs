//! Root application controller.
//!
//! Owns the redirect hub (the only writer), the screen view models and the
//! navigation state the terminal shell renders from.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use super::collection::{CollectionSideEffect, CollectionViewModel};
use super::deeplink::{DeeplinkHub, DeeplinkReceiver, DeeplinkSettings, PendingRedirect};
use super::detail::{DetailSideEffect, DetailViewModel};
use super::explore::{ExploreReloadFlag, ExploreSideEffect, ExploreViewModel, FeedSettings};
use super::mint::{MintSettings, MintSideEffect, MintViewModel, RecipeMetadataState};
use super::sign_in::{SignInSideEffect, SignInViewModel};
use crate::domain::{
    ArtRepository, AuthRepository, AuthService, GetArtDetails, GetArtFeed, GetMyProfile, LikeArt,
    PreferencesRepository, Recipe, TokenId, UploadArtwork, UserRepository,
};

/// Screen currently shown by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Explore,
    SignIn,
    Collection,
    Detail(TokenId),
    Receipt(TokenId),
    RecipeMetadata,
    MintSuccess(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub auth_url: String,
    pub deeplink: DeeplinkSettings,
    pub feed: FeedSettings,
    pub mint: MintSettings,
}

/// Backends the controller wires into its view models.
pub struct Services {
    pub art: Arc<dyn ArtRepository>,
    pub auth: Arc<dyn AuthRepository>,
    pub users: Arc<dyn UserRepository>,
    pub preferences: Arc<dyn PreferencesRepository>,
}

struct MintFlow {
    view_model: MintViewModel,
    side_effects: UnboundedReceiver<MintSideEffect>,
}

struct DetailFlow {
    view_model: DetailViewModel,
    side_effects: UnboundedReceiver<DetailSideEffect>,
}

/// Root state of the client.
///
/// Screen view models that live for the whole session (explore, sign-in,
/// collection) are created up front. Detail and mint view models are created
/// when their screen is entered and dropped when it is left.
pub struct App {
    /// Screen the shell renders.
    pub screen: Screen,
    /// Highlighted row of the explore feed.
    pub selected: usize,
    /// One-line message for the status bar, cleared on the next key press.
    pub status_message: Option<String>,
    deeplinks: DeeplinkHub,
    redirects: DeeplinkReceiver,
    explore: ExploreViewModel,
    explore_effects: UnboundedReceiver<ExploreSideEffect>,
    sign_in: SignInViewModel,
    sign_in_effects: UnboundedReceiver<SignInSideEffect>,
    collection: CollectionViewModel,
    collection_effects: UnboundedReceiver<CollectionSideEffect>,
    detail: Option<DetailFlow>,
    mint: Option<MintFlow>,
    auth: AuthService,
    get_art_details: GetArtDetails,
    upload_artwork: UploadArtwork,
    reload: ExploreReloadFlag,
    settings: AppSettings,
}

impl App {
    /// Creates the controller on the explore screen.
    ///
    /// Nothing is fetched until [`App::start`] runs.
    ///
    /// # Arguments
    ///
    /// * `settings` - URLs, redirect handling and feed behaviour
    /// * `services` - Backends for art, auth, profile and preferences
    pub fn new(settings: AppSettings, services: Services) -> Self {
        let auth = AuthService::new(services.auth, services.preferences);
        let reload = ExploreReloadFlag::default();
        let (explore, explore_effects) = ExploreViewModel::new(
            auth.clone(),
            GetArtFeed::new(services.art.clone()),
            LikeArt::new(services.art.clone()),
            reload.clone(),
            settings.feed.clone(),
        );
        let (sign_in, sign_in_effects) = SignInViewModel::new(auth.clone());
        let (collection, collection_effects) =
            CollectionViewModel::new(auth.clone(), GetMyProfile::new(services.users));
        let deeplinks = DeeplinkHub::new(settings.deeplink.clone());
        let redirects = deeplinks.subscribe();

        Self {
            screen: Screen::Explore,
            selected: 0,
            status_message: None,
            deeplinks,
            redirects,
            explore,
            explore_effects,
            sign_in,
            sign_in_effects,
            collection,
            collection_effects,
            detail: None,
            mint: None,
            auth,
            get_art_details: GetArtDetails::new(services.art.clone()),
            upload_artwork: UploadArtwork::new(services.art),
            reload,
            settings,
        }
    }

    pub fn explore(&self) -> &ExploreViewModel {
        &self.explore
    }

    pub fn sign_in(&self) -> &SignInViewModel {
        &self.sign_in
    }

    pub fn collection(&self) -> &CollectionViewModel {
        &self.collection
    }

    /// View model of the open detail screen, if any.
    pub fn detail(&self) -> Option<&DetailViewModel> {
        self.detail.as_ref().map(|flow| &flow.view_model)
    }

    /// View model of the open mint screen, if any.
    pub fn mint(&self) -> Option<&MintViewModel> {
        self.mint.as_ref().map(|flow| &flow.view_model)
    }

    pub fn auth_url(&self) -> &str {
        &self.settings.auth_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.check_authenticate_state()
    }

    /// Loads the first feed page and the profile.
    pub async fn start(&mut self) {
        self.explore.on_mount().await;
        self.collection.on_mount().await;
    }

    /// Entry point for redirects coming back from an external page.
    ///
    /// # Arguments
    ///
    /// * `uri` - The full redirect URI; an empty string clears the pending one
    pub fn on_external_redirect(&self, uri: &str) {
        self.deeplinks.on_external_redirect(uri);
    }

    /// Delivers a pending redirect to the active screen and applies queued
    /// side effects. Called once per event-loop iteration.
    ///
    /// Redirects are only taken on the sign-in and mint screens, and each is
    /// delivered at most once. A redirect that arrives while another screen
    /// is shown stays pending until it auto-clears.
    pub async fn tick(&mut self) {
        if matches!(self.screen, Screen::SignIn | Screen::RecipeMetadata) {
            if let Some(redirect) = self.redirects.take() {
                self.deliver_redirect(redirect).await;
            }
        }
        self.drain_side_effects().await;
    }

    async fn deliver_redirect(&mut self, redirect: PendingRedirect) {
        tracing::debug!(generation = redirect.generation, screen = ?self.screen, "redirect delivered");
        match self.screen {
            Screen::SignIn => {
                let payload = redirect.payload.unwrap_or_default();
                self.sign_in.on_web_view_login_result(&payload).await;
            }
            Screen::RecipeMetadata => {
                let (Some(payload), Some(flow)) = (redirect.payload, self.mint.as_ref()) else {
                    tracing::warn!("mint redirect without confirmation payload ignored");
                    return;
                };
                flow.view_model.on_confirm(&payload).await;
            }
            _ => {}
        }
    }

    async fn drain_side_effects(&mut self) {
        while let Ok(effect) = self.explore_effects.try_recv() {
            match effect {
                ExploreSideEffect::GoDetail { token_id } => self.open_detail(token_id).await,
                ExploreSideEffect::GoSignInScreen => self.screen = Screen::SignIn,
            }
        }

        while let Ok(effect) = self.sign_in_effects.try_recv() {
            match effect {
                SignInSideEffect::GoExploreTab => {
                    self.status_message = Some("Signed in".to_string());
                    self.collection.on_resume().await;
                    self.go_explore().await;
                }
                SignInSideEffect::ShowErrorToast => {
                    self.status_message = Some("Sign in with wallet failed.".to_string());
                }
            }
        }

        while let Ok(effect) = self.collection_effects.try_recv() {
            match effect {
                CollectionSideEffect::GoDetailScreen { token_id } => self.open_detail(token_id).await,
                CollectionSideEffect::SignedOut => {
                    self.status_message = Some("Signed out".to_string());
                    self.go_explore().await;
                }
                CollectionSideEffect::ShowErrorToast => {
                    self.status_message = Some("Sign out failed.".to_string());
                }
            }
        }

        let mut detail_effects = Vec::new();
        if let Some(flow) = self.detail.as_mut() {
            while let Ok(effect) = flow.side_effects.try_recv() {
                detail_effects.push(effect);
            }
        }
        for effect in detail_effects {
            match effect {
                DetailSideEffect::GoReceiptScreen { token_id } => {
                    self.screen = Screen::Receipt(token_id);
                }
            }
        }

        let mut mint_effects = Vec::new();
        if let Some(flow) = self.mint.as_mut() {
            while let Ok(effect) = flow.side_effects.try_recv() {
                mint_effects.push(effect);
            }
        }
        for effect in mint_effects {
            match effect {
                MintSideEffect::GoSuccessScreen { confirmation } => {
                    self.mint = None;
                    self.screen = Screen::MintSuccess(confirmation);
                }
            }
        }
    }

    /// Returns to the feed, reloading it if another screen flagged it stale.
    pub async fn go_explore(&mut self) {
        self.screen = Screen::Explore;
        self.detail = None;
        self.explore.on_resume().await;
        self.clamp_selection();
    }

    pub fn go_sign_in(&mut self) {
        self.screen = Screen::SignIn;
    }

    /// Shows the collection tab, refreshing the profile.
    pub async fn go_collection(&mut self) {
        self.screen = Screen::Collection;
        self.collection.on_resume().await;
    }

    /// Opens the detail screen of `token_id` and loads its record.
    pub async fn open_detail(&mut self, token_id: TokenId) {
        let (view_model, side_effects) =
            DetailViewModel::new(token_id, self.get_art_details.clone());
        self.screen = Screen::Detail(token_id);
        let flow = self.detail.insert(DetailFlow {
            view_model,
            side_effects,
        });
        flow.view_model.on_enter().await;
    }

    /// Leaves the receipt for the detail it was opened from.
    pub fn back_to_detail(&mut self) {
        match self.detail() {
            Some(detail) => self.screen = Screen::Detail(detail.token_id()),
            None => self.screen = Screen::Explore,
        }
    }

    pub fn buy_or_try(&self) {
        if let Some(detail) = self.detail() {
            detail.on_buy_or_try_button_click();
        }
    }

    /// Opens the sale metadata screen for a freshly generated artwork.
    pub fn start_mint(&mut self, initial: RecipeMetadataState) {
        let (view_model, side_effects) = MintViewModel::new(
            initial,
            self.upload_artwork.clone(),
            self.reload.clone(),
            self.settings.mint.clone(),
        );
        self.mint = Some(MintFlow {
            view_model,
            side_effects,
        });
        self.screen = Screen::RecipeMetadata;
    }

    /// Starts minting a derivative of the artwork on the detail screen,
    /// reusing its recipe with the artwork as parent.
    ///
    /// Sets a status message instead when the recipe is not available.
    pub fn start_remix(&mut self) {
        let Some(details) = self.detail().and_then(|detail| detail.state().details) else {
            self.status_message = Some("Artwork is still loading".to_string());
            return;
        };
        let Some(recipe) = details.recipe else {
            self.status_message = Some("Recipe is not available for this artwork".to_string());
            return;
        };
        let recipe = Recipe {
            parent_token_id: Some(details.token_id),
            ..recipe
        };
        self.start_mint(RecipeMetadataState::new(recipe, details.image_url));
    }

    /// Signs out through the collection settings; the outcome is applied on
    /// the next [`App::tick`].
    pub fn sign_out(&self) {
        self.collection.on_setting_click();
    }

    pub fn select_next(&mut self) {
        let len = self.explore.state().feeds.len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.explore.state().feeds.len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn selected_token(&self) -> Option<TokenId> {
        self.explore
            .state()
            .feeds
            .get(self.selected)
            .map(|item| item.token_id)
    }

    /// Moving onto the last row counts as reaching the end of the list.
    pub async fn select_next_or_load_more(&mut self) {
        self.select_next();
        let len = self.explore.state().feeds.len();
        if len > 0 && self.selected + 1 == len {
            self.explore.on_scroll_end().await;
        }
    }

    pub fn like_selected(&self) {
        if let Some(token_id) = self.selected_token() {
            self.explore.on_like_click(token_id);
        }
    }

    pub fn open_selected(&self) {
        if let Some(token_id) = self.selected_token() {
            self.explore.on_image_click(token_id);
        }
    }

    /// Selects the filter after the current one, wrapping around.
    pub async fn cycle_filter(&mut self) {
        let state = self.explore.state();
        if state.filters.is_empty() {
            return;
        }
        let next = match &state.selected_filter {
            Some(current) => state
                .filters
                .iter()
                .position(|f| f == current)
                .map_or(0, |i| (i + 1) % state.filters.len()),
            None => 0,
        };
        self.explore.on_filter_click(state.filters[next].clone()).await;
        self.clamp_selection();
    }
}
