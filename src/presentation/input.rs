use crate::application::{App, MintViewModel, Screen};
use crossterm::event::KeyCode;

const PRICE_STEP: f64 = 0.5;

/// Maps key presses onto the intents of the active screen.
pub struct InputHandler;

impl InputHandler {
    /// Handles one key press.
    ///
    /// Clears the status message first, so a message stays visible until
    /// the user does something.
    ///
    /// # Arguments
    ///
    /// * `app` - Controller receiving the intent
    /// * `key` - The pressed key
    pub async fn handle_key_event(app: &mut App, key: KeyCode) {
        app.status_message = None;

        match app.screen {
            Screen::Explore => Self::handle_explore(app, key).await,
            Screen::SignIn => match key {
                KeyCode::Char('p') => Self::paste_redirect(app),
                KeyCode::Esc => app.go_explore().await,
                _ => {}
            },
            Screen::RecipeMetadata => Self::handle_recipe_metadata(app, key).await,
            Screen::Collection => match key {
                KeyCode::Char('o') => app.sign_out(),
                KeyCode::Esc => app.go_explore().await,
                _ => {}
            },
            Screen::Detail(_) => match key {
                KeyCode::Char('b') => app.buy_or_try(),
                KeyCode::Char('m') => app.start_remix(),
                KeyCode::Esc => app.go_explore().await,
                _ => {}
            },
            Screen::Receipt(_) => match key {
                KeyCode::Char('m') => app.start_remix(),
                KeyCode::Esc => app.back_to_detail(),
                _ => {}
            },
            Screen::MintSuccess(_) => {
                if key == KeyCode::Esc {
                    app.go_explore().await;
                }
            }
        }
    }

    async fn handle_explore(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Char('j') => app.select_next_or_load_more().await,
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Char('l') => app.like_selected(),
            KeyCode::Enter => app.open_selected(),
            KeyCode::Char('f') => app.cycle_filter().await,
            KeyCode::Char('r') => app.go_explore().await,
            KeyCode::Char('c') => app.go_collection().await,
            KeyCode::Char('s') => app.go_sign_in(),
            KeyCode::Char('o') => app.sign_out(),
            KeyCode::Char('p') => Self::paste_redirect(app),
            _ => {}
        }
    }

    async fn handle_recipe_metadata(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('p') => return Self::paste_redirect(app),
            KeyCode::Char('y') => return Self::copy_mint_url(app),
            KeyCode::Esc => return app.go_explore().await,
            _ => {}
        }
        let Some(mint) = app.mint() else {
            return;
        };
        match key {
            KeyCode::Char('n') => mint.on_not_for_sale_button_click(),
            KeyCode::Char('o') => mint.on_open_source_button_click(),
            KeyCode::Char('+') => Self::step_price(mint, PRICE_STEP),
            KeyCode::Char('-') => Self::step_price(mint, -PRICE_STEP),
            KeyCode::Char(']') => mint.on_royalty_changed(mint.state().royalty_fee + 1),
            KeyCode::Char('[') => {
                mint.on_royalty_changed(mint.state().royalty_fee.saturating_sub(1))
            }
            _ => {}
        }
    }

    fn step_price(mint: &MintViewModel, step: f64) {
        let price = (mint.state().price_in_flow + step).max(0.0);
        mint.on_price_change(&format!("{price:.2}"));
    }

    /// Copies the mint page URL so it can be opened in a browser.
    fn copy_mint_url(app: &mut App) {
        let url = match app.mint().map(MintViewModel::mint_url) {
            Some(Ok(url)) => url,
            Some(Err(err)) => {
                app.status_message = Some(format!("Mint unavailable: {err}"));
                return;
            }
            None => return,
        };
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url)) {
            Ok(()) => app.status_message = Some("Mint URL copied".to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard unavailable");
                app.status_message = Some(format!("Clipboard unavailable: {err}"));
            }
        }
    }

    /// Reads a redirect URI from the clipboard, standing in for the OS
    /// delivering the deeplink.
    fn paste_redirect(app: &mut App) {
        let text = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text());
        match text {
            Ok(uri) => {
                app.on_external_redirect(uri.trim());
                app.status_message = Some("Redirect received".to_string());
            }
            Err(err) => {
                tracing::warn!(error = %err, "clipboard unavailable");
                app.status_message = Some(format!("Clipboard unavailable: {err}"));
            }
        }
    }
}
