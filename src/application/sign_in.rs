//! Wallet sign-in resumed from the auth page redirect.

use tokio::sync::mpsc::UnboundedReceiver;

use super::container::Container;
use crate::domain::{AuthService, ClientError, Credentials, User};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignInState {
    pub is_loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignInSideEffect {
    GoExploreTab,
    ShowErrorToast,
}

pub struct SignInViewModel {
    container: Container<SignInState, SignInSideEffect>,
    auth: AuthService,
}

impl SignInViewModel {
    pub fn new(auth: AuthService) -> (Self, UnboundedReceiver<SignInSideEffect>) {
        let (container, side_effects) = Container::new(SignInState::default());
        (Self { container, auth }, side_effects)
    }

    pub fn state(&self) -> SignInState {
        self.container.state()
    }

    /// Exchanges the auth page payload for credentials.
    ///
    /// A rejected sign-in is retried as a sign-up for first-time wallets.
    /// Failures the user has to know about post `ShowErrorToast`: a failed
    /// sign-up, and credentials that were issued but could not be stored.
    /// Sign-in failures that never reached the server are logged and dropped.
    ///
    /// # Arguments
    ///
    /// * `raw_payload` - The payload of the auth page redirect, undecoded
    pub async fn on_web_view_login_result(&self, raw_payload: &str) {
        self.container.reduce(|state| state.is_loading = true);

        match self.auth.sign_in(raw_payload).await {
            Ok(session) => self.signed_in("sign in", session),
            Err(err @ ClientError::Storage(_)) => self.failed("sign in", &err),
            Err(err) if err.is_api_failure() => {
                tracing::debug!(error = %err, "sign in rejected, trying sign up");
                self.sign_up(raw_payload).await;
            }
            Err(err) => {
                tracing::error!(error = %err, "sign in failed");
                self.container.reduce(|state| state.is_loading = false);
            }
        }
    }

    async fn sign_up(&self, raw_payload: &str) {
        match self.auth.sign_up(raw_payload).await {
            Ok(session) => self.signed_in("sign up", session),
            Err(err) => self.failed("sign up", &err),
        }
    }

    fn failed(&self, flow: &str, err: &ClientError) {
        tracing::error!(flow, error = %err, "authentication failed");
        self.container.post_side_effect(SignInSideEffect::ShowErrorToast);
        self.container.reduce(|state| state.is_loading = false);
    }

    fn signed_in(&self, flow: &str, (_, user): (Credentials, User)) {
        tracing::debug!(flow, user_id = user.id, address = %user.address, "authenticated");
        self.container.reduce(|state| state.is_loading = false);
        self.container.post_side_effect(SignInSideEffect::GoExploreTab);
    }
}
