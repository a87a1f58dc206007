//! Artwork detail screen.

use tokio::sync::mpsc::UnboundedReceiver;

use super::container::Container;
use crate::domain::{ArtDetails, GetArtDetails, TokenId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    pub is_loading: bool,
    pub details: Option<ArtDetails>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailSideEffect {
    GoReceiptScreen { token_id: TokenId },
}

/// State of the detail screen for one artwork.
///
/// The view model is created when the screen is entered and dropped when it
/// is left, so it never outlives the token it was opened for.
pub struct DetailViewModel {
    token_id: TokenId,
    container: Container<DetailState, DetailSideEffect>,
    get_art_details: GetArtDetails,
}

impl DetailViewModel {
    pub fn new(
        token_id: TokenId,
        get_art_details: GetArtDetails,
    ) -> (Self, UnboundedReceiver<DetailSideEffect>) {
        let (container, side_effects) = Container::new(DetailState::default());
        let view_model = Self {
            token_id,
            container,
            get_art_details,
        };
        (view_model, side_effects)
    }

    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    pub fn state(&self) -> DetailState {
        self.container.state()
    }

    /// Loads the artwork record.
    ///
    /// A failed load is logged and leaves `details` empty; the loading flag
    /// is cleared either way.
    pub async fn on_enter(&self) {
        self.container.reduce(|state| state.is_loading = true);

        match self.get_art_details.call(self.token_id).await {
            Ok(details) => {
                tracing::debug!(token_id = self.token_id, "art details loaded");
                self.container.reduce(|state| {
                    state.is_loading = false;
                    state.details = Some(details);
                });
            }
            Err(err) => {
                tracing::error!(token_id = self.token_id, error = %err, "failed to load art details");
                self.container.reduce(|state| state.is_loading = false);
            }
        }
    }

    pub fn on_buy_or_try_button_click(&self) {
        self.container.post_side_effect(DetailSideEffect::GoReceiptScreen {
            token_id: self.token_id,
        });
    }
}
