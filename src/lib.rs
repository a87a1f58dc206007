//! Duckee - client core for an AI-art marketplace.
//!
//! Owns the explore feed, the wallet sign-in and mint hand-offs to external
//! browser pages, and the redirect protocol that resumes them. Platform
//! shells only render state and forward user intents.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
