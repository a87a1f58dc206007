//! Collection tab: the signed-in user's profile and the sign-out setting.

use tokio::sync::mpsc::UnboundedReceiver;

use super::container::Container;
use crate::domain::{AuthService, GetMyProfile, TokenId, User};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionState {
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionSideEffect {
    GoDetailScreen { token_id: TokenId },
    SignedOut,
    ShowErrorToast,
}

pub struct CollectionViewModel {
    container: Container<CollectionState, CollectionSideEffect>,
    auth: AuthService,
    get_my_profile: GetMyProfile,
}

impl CollectionViewModel {
    pub fn new(
        auth: AuthService,
        get_my_profile: GetMyProfile,
    ) -> (Self, UnboundedReceiver<CollectionSideEffect>) {
        let (container, side_effects) = Container::new(CollectionState::default());
        let view_model = Self {
            container,
            auth,
            get_my_profile,
        };
        (view_model, side_effects)
    }

    pub fn state(&self) -> CollectionState {
        self.container.state()
    }

    pub async fn on_mount(&self) {
        self.load_profile().await;
    }

    /// Refreshes the profile every time the tab comes back into view.
    pub async fn on_resume(&self) {
        self.load_profile().await;
    }

    pub fn on_art_click(&self, token_id: TokenId) {
        self.container
            .post_side_effect(CollectionSideEffect::GoDetailScreen { token_id });
    }

    /// Signs out and forgets the loaded profile.
    pub fn on_setting_click(&self) {
        match self.auth.sign_out() {
            Ok(()) => {
                tracing::debug!("signed out");
                self.container.reduce(|state| state.user = None);
                self.container.post_side_effect(CollectionSideEffect::SignedOut);
            }
            Err(err) => {
                tracing::error!(error = %err, "sign out failed");
                self.container.post_side_effect(CollectionSideEffect::ShowErrorToast);
            }
        }
    }

    /// Guests have no profile; a failed fetch keeps whatever was shown.
    async fn load_profile(&self) {
        if !self.auth.check_authenticate_state() {
            self.container.reduce(|state| state.user = None);
            return;
        }
        match self.get_my_profile.call().await {
            Ok(user) => self.container.reduce(|state| state.user = Some(user)),
            Err(err) => tracing::warn!(error = %err, "failed to load profile"),
        }
    }
}
