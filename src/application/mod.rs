//! Application layer managing screen state and flows.
//!
//! This module coordinates between the domain layer and the presentation
//! layer: per-screen view models, the redirect hand-off protocol and the root
//! controller that ties them together.

pub mod app;
pub mod collection;
pub mod container;
pub mod deeplink;
pub mod detail;
pub mod explore;
pub mod mint;
pub mod sign_in;

#[cfg(test)]
pub(crate) mod fakes;

pub use app::*;
pub use collection::*;
pub use container::*;
pub use deeplink::*;
pub use detail::*;
pub use explore::*;
pub use mint::*;
pub use sign_in::*;
