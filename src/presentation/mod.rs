//! Presentation layer handling the terminal UI and user input.
//!
//! Renders the explore feed and sign-in screen with ratatui and maps
//! keyboard input onto view model intents.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
