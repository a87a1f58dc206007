//! Sale metadata for a generated artwork and the external mint round-trip.
//!
//! The user picks price, royalty and description, the serialized artwork is
//! handed to the external mint page, and the page redirects back with an
//! opaque confirmation that gets uploaded together with the metadata.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use super::container::Container;
use super::deeplink::external_flow_url;
use super::explore::ExploreReloadFlag;
use crate::domain::{ClientResult, Recipe, UploadArt, UploadArtwork};

/// Sale metadata the user edits before minting.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeMetadataState {
    pub recipe: Recipe,
    pub image_url: String,
    pub for_sale: bool,
    pub is_open_source: bool,
    pub price_in_flow: f64,
    pub royalty_fee: u32,
    pub description: String,
    pub is_uploading: bool,
}

impl RecipeMetadataState {
    /// Fresh metadata for a generated image: for sale, no price, no royalty.
    ///
    /// # Arguments
    ///
    /// * `recipe` - Generation parameters of the image
    /// * `image_url` - Where the generated image is hosted
    pub fn new(recipe: Recipe, image_url: impl Into<String>) -> Self {
        Self {
            recipe,
            image_url: image_url.into(),
            for_sale: true,
            is_open_source: false,
            price_in_flow: 0.0,
            royalty_fee: 0,
            description: String::new(),
            is_uploading: false,
        }
    }

    fn upload(&self, mint_confirmation: String) -> UploadArt {
        UploadArt {
            for_sale: self.for_sale,
            image_url: self.image_url.clone(),
            description: (!self.description.trim().is_empty()).then(|| self.description.clone()),
            price_in_flow: self.price_in_flow,
            royalty_fee: self.royalty_fee,
            is_imported: false,
            recipe: self.recipe.clone(),
            mint_confirmation,
        }
    }
}

/// What the mint page receives under the payload key.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MintRequest<'a> {
    image_url: &'a str,
    for_sale: bool,
    price_in_flow: f64,
    royalty_fee: u32,
    description: &'a str,
    #[serde(flatten)]
    recipe: &'a Recipe,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MintSideEffect {
    GoSuccessScreen { confirmation: String },
}

/// Where the mint page lives and how royalties are bounded.
#[derive(Debug, Clone, PartialEq)]
pub struct MintSettings {
    pub mint_url: String,
    pub query_key: String,
    /// Royalty percentages above this are clamped.
    pub max_royalty: u32,
}

pub struct MintViewModel {
    container: Container<RecipeMetadataState, MintSideEffect>,
    upload_artwork: UploadArtwork,
    reload: ExploreReloadFlag,
    settings: MintSettings,
}

impl MintViewModel {
    pub fn new(
        initial: RecipeMetadataState,
        upload_artwork: UploadArtwork,
        reload: ExploreReloadFlag,
        settings: MintSettings,
    ) -> (Self, UnboundedReceiver<MintSideEffect>) {
        let (container, side_effects) = Container::new(initial);
        let view_model = Self {
            container,
            upload_artwork,
            reload,
            settings,
        };
        (view_model, side_effects)
    }

    pub fn state(&self) -> RecipeMetadataState {
        self.container.state()
    }

    pub fn on_not_for_sale_button_click(&self) {
        self.container.reduce(|state| state.for_sale = !state.for_sale);
    }

    /// Open-source artworks are free, so the price is pinned to zero.
    pub fn on_open_source_button_click(&self) {
        self.container.reduce(|state| {
            state.is_open_source = !state.is_open_source;
            if state.is_open_source {
                state.price_in_flow = 0.0;
            }
        });
    }

    /// Sets the price from text input.
    ///
    /// Input that does not parse, or parses to a negative or non-finite
    /// number, is ignored. A price of zero marks the artwork open source.
    pub fn on_price_change(&self, input: &str) {
        let price = match input.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => price,
            _ => {
                tracing::debug!(input, "ignoring unparseable price");
                return;
            }
        };
        self.container.reduce(|state| {
            state.price_in_flow = price;
            state.is_open_source = price == 0.0;
        });
    }

    pub fn on_royalty_changed(&self, royalty: u32) {
        let royalty = royalty.min(self.settings.max_royalty);
        self.container.reduce(|state| state.royalty_fee = royalty);
    }

    pub fn on_description_changed(&self, description: impl Into<String>) {
        let description = description.into();
        self.container.reduce(|state| state.description = description);
    }

    /// JSON handed to the mint page: the recipe plus the sale metadata.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidPayload` if serialization fails.
    pub fn serialize_art(&self) -> ClientResult<String> {
        let state = self.container.state();
        let request = MintRequest {
            image_url: &state.image_url,
            for_sale: state.for_sale,
            price_in_flow: state.price_in_flow,
            royalty_fee: state.royalty_fee,
            description: &state.description,
            recipe: &state.recipe,
        };
        Ok(serde_json::to_string(&request)?)
    }

    /// URL of the external mint page for the current metadata.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` when the configured mint URL is not a
    /// valid URL.
    pub fn mint_url(&self) -> ClientResult<String> {
        external_flow_url(&self.settings.mint_url, &self.settings.query_key, &self.serialize_art()?)
    }

    /// Uploads the artwork once the mint page has confirmed the transaction.
    ///
    /// On success the explore feed is flagged for reload and the success
    /// screen is requested. A failed upload is logged only.
    ///
    /// # Arguments
    ///
    /// * `mint_confirmation` - Opaque payload of the mint page redirect
    pub async fn on_confirm(&self, mint_confirmation: &str) {
        let art = self.container.state().upload(mint_confirmation.to_string());
        self.container.reduce(|state| state.is_uploading = true);

        match self.upload_artwork.call(art).await {
            Ok(()) => {
                tracing::debug!("artwork uploaded");
                self.reload.request_reload();
                self.container.reduce(|state| state.is_uploading = false);
                self.container.post_side_effect(MintSideEffect::GoSuccessScreen {
                    confirmation: mint_confirmation.to_string(),
                });
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to upload minted artwork");
                self.container.reduce(|state| state.is_uploading = false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::FakeArtRepository;
    use crate::domain::ClientError;
    use std::sync::Arc;

    struct Harness {
        view_model: MintViewModel,
        effects: UnboundedReceiver<MintSideEffect>,
        art: Arc<FakeArtRepository>,
        reload: ExploreReloadFlag,
    }

    fn recipe() -> Recipe {
        Recipe {
            model_name: "stable-diffusion-v1-5".into(),
            prompt: "a duck in a space suit".into(),
            size_width: 512,
            size_height: 768,
            seed: Some(42),
            ..Recipe::default()
        }
    }

    fn harness() -> Harness {
        let art = Arc::new(FakeArtRepository::default());
        let reload = ExploreReloadFlag::default();
        let (view_model, effects) = MintViewModel::new(
            RecipeMetadataState::new(recipe(), "https://img.duckee.xyz/new.png"),
            UploadArtwork::new(art.clone()),
            reload.clone(),
            MintSettings {
                mint_url: "https://with-solana.duckee.xyz/transact/mint".into(),
                query_key: "data".into(),
                max_royalty: 50,
            },
        );
        Harness {
            view_model,
            effects,
            art,
            reload,
        }
    }

    #[test]
    fn test_price_and_open_source() {
        let h = harness();
        h.view_model.on_price_change("2.5");
        assert_eq!(h.view_model.state().price_in_flow, 2.5);
        assert!(!h.view_model.state().is_open_source);

        h.view_model.on_price_change("abc");
        h.view_model.on_price_change("-1");
        assert_eq!(h.view_model.state().price_in_flow, 2.5);

        h.view_model.on_open_source_button_click();
        let state = h.view_model.state();
        assert!(state.is_open_source);
        assert_eq!(state.price_in_flow, 0.0);
    }

    #[test]
    fn test_metadata_toggles() {
        let h = harness();
        h.view_model.on_not_for_sale_button_click();
        assert!(!h.view_model.state().for_sale);

        h.view_model.on_royalty_changed(80);
        assert_eq!(h.view_model.state().royalty_fee, 50);

        h.view_model.on_description_changed("my first duck");
        assert_eq!(h.view_model.state().description, "my first duck");
    }

    #[test]
    fn test_mint_url_carries_serialized_art() {
        let h = harness();
        h.view_model.on_price_change("3");

        let url = reqwest::Url::parse(&h.view_model.mint_url().unwrap()).unwrap();
        assert_eq!(url.path(), "/transact/mint");
        let (key, data) = url.query_pairs().next().unwrap();
        assert_eq!(key, "data");

        let art: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(art["prompt"], "a duck in a space suit");
        assert_eq!(art["priceInFlow"], 3.0);
        assert_eq!(art["imageUrl"], "https://img.duckee.xyz/new.png");
    }

    #[tokio::test]
    async fn test_confirm_uploads_and_invalidates_feed() {
        let mut h = harness();
        h.view_model.on_description_changed("  ");

        h.view_model.on_confirm("{\"signature\":\"5xyz\"}").await;

        let uploads = h.art.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].mint_confirmation, "{\"signature\":\"5xyz\"}");
        assert_eq!(uploads[0].description, None);
        assert_eq!(uploads[0].recipe, recipe());
        assert!(h.reload.is_reload_pending());
        assert_eq!(
            h.effects.try_recv().unwrap(),
            MintSideEffect::GoSuccessScreen {
                confirmation: "{\"signature\":\"5xyz\"}".into()
            }
        );
        assert!(!h.view_model.state().is_uploading);
    }

    #[tokio::test]
    async fn test_failed_upload_is_logged_only() {
        let mut h = harness();
        h.art.fail_uploads(ClientError::api(500, "upload failed"));

        h.view_model.on_confirm("confirmation").await;

        assert!(!h.reload.is_reload_pending());
        assert!(h.effects.try_recv().is_err());
        assert!(!h.view_model.state().is_uploading);
    }
}
