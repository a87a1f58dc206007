//! Hand-off to external browser flows and resume via redirect deeplinks.
//!
//! The app opens an external page (wallet auth, mint transaction) and the page
//! redirects back with a URI carrying one opaque payload under a fixed query
//! key. `DeeplinkHub` is the single writer that stores the latest redirect;
//! screens hold a `DeeplinkReceiver`, which can read, acknowledge or take the
//! pending redirect but never store one.
//!
//! Only one redirect is pending at a time. A new redirect overwrites an
//! unconsumed one, and each stored redirect gets a fresh generation number so
//! a late timer or acknowledgement can never clear a newer redirect.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::domain::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeeplinkSettings {
    /// Query parameter holding the payload.
    pub query_key: String,
    /// Delay before an unconsumed redirect is dropped. Zero disables the
    /// timer; redirects then stay until a receiver acknowledges them.
    pub auto_clear_ms: u64,
}

impl Default for DeeplinkSettings {
    fn default() -> Self {
        Self {
            query_key: "data".to_string(),
            auto_clear_ms: 500,
        }
    }
}

impl DeeplinkSettings {
    pub fn auto_clear_delay(&self) -> Option<Duration> {
        (self.auto_clear_ms > 0).then(|| Duration::from_millis(self.auto_clear_ms))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingRedirect {
    pub generation: u64,
    pub uri: String,
    /// Value of the payload query parameter, undecoded beyond URL escaping.
    pub payload: Option<String>,
    pub received_at: Instant,
}

#[derive(Debug)]
struct Shared {
    slot: watch::Sender<Option<PendingRedirect>>,
    generations: AtomicU64,
    settings: DeeplinkSettings,
}

impl Shared {
    fn clear_generation(&self, generation: u64) -> bool {
        self.slot.send_if_modified(|slot| match slot {
            Some(pending) if pending.generation == generation => {
                *slot = None;
                true
            }
            _ => false,
        })
    }
}

/// Owner side of the redirect slot. Held by the root controller only.
#[derive(Debug)]
pub struct DeeplinkHub {
    shared: Arc<Shared>,
}

impl DeeplinkHub {
    pub fn new(settings: DeeplinkSettings) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                slot,
                generations: AtomicU64::new(0),
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &DeeplinkSettings {
        &self.shared.settings
    }

    pub fn subscribe(&self) -> DeeplinkReceiver {
        DeeplinkReceiver {
            shared: Arc::clone(&self.shared),
            rx: self.shared.slot.subscribe(),
        }
    }

    /// Stores `uri` as the pending redirect, replacing anything unconsumed.
    ///
    /// An empty URI stores nothing, which clears the slot. Returns the
    /// generation assigned to the stored redirect.
    pub fn on_external_redirect(&self, uri: &str) -> Option<u64> {
        let uri = uri.trim();
        if uri.is_empty() {
            self.shared.slot.send_replace(None);
            return None;
        }

        let generation = self.shared.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let payload = extract_payload(uri, &self.shared.settings.query_key);
        if payload.is_none() {
            tracing::warn!(uri, "redirect carries no payload");
        }
        self.shared.slot.send_replace(Some(PendingRedirect {
            generation,
            uri: uri.to_string(),
            payload,
            received_at: Instant::now(),
        }));
        tracing::debug!(generation, "redirect stored");

        if let Some(delay) = self.shared.settings.auto_clear_delay() {
            self.schedule_auto_clear(generation, delay);
        }
        Some(generation)
    }

    /// Drops the redirect of `generation` if it is still pending, whether or
    /// not a screen has read it.
    pub fn auto_clear(&self, generation: u64) -> bool {
        let cleared = self.shared.clear_generation(generation);
        if cleared {
            tracing::debug!(generation, "unconsumed redirect auto-cleared");
        }
        cleared
    }

    fn schedule_auto_clear(&self, generation: u64, delay: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(generation, "no async runtime, redirect will not auto-clear");
            return;
        };
        let hub = DeeplinkHub {
            shared: Arc::clone(&self.shared),
        };
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            hub.auto_clear(generation);
        });
    }
}

/// Read/acknowledge capability on the redirect slot.
#[derive(Debug, Clone)]
pub struct DeeplinkReceiver {
    shared: Arc<Shared>,
    rx: watch::Receiver<Option<PendingRedirect>>,
}

impl DeeplinkReceiver {
    pub fn current(&self) -> Option<PendingRedirect> {
        self.rx.borrow().clone()
    }

    /// Payload of the pending redirect. Does not clear it.
    pub fn consume(&self) -> Option<String> {
        self.rx.borrow().as_ref().and_then(|pending| pending.payload.clone())
    }

    /// Marks the redirect of `generation` as processed.
    pub fn acknowledge(&self, generation: u64) -> bool {
        self.shared.clear_generation(generation)
    }

    /// Removes and returns the pending redirect. Of several receivers racing
    /// for the same redirect exactly one gets it.
    pub fn take(&self) -> Option<PendingRedirect> {
        let mut taken = None;
        self.shared.slot.send_if_modified(|slot| {
            taken = slot.take();
            taken.is_some()
        });
        taken
    }

    /// Waits for a redirect to become pending and takes it.
    ///
    /// Returns `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<PendingRedirect> {
        loop {
            self.rx.wait_for(Option::is_some).await.ok()?;
            if let Some(pending) = self.take() {
                return Some(pending);
            }
        }
    }
}

/// Builds the URL of an external page, passing `payload` under `query_key`.
pub fn external_flow_url(base: &str, query_key: &str, payload: &str) -> ClientResult<String> {
    let mut url = Url::parse(base).map_err(|e| ClientError::Config(format!("{base}: {e}")))?;
    url.query_pairs_mut().append_pair(query_key, payload);
    Ok(url.into())
}

fn extract_payload(uri: &str, query_key: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == query_key)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> DeeplinkHub {
        DeeplinkHub::new(DeeplinkSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_payload_consumed_within_window() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=xyz");
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(receiver.consume().as_deref(), Some("xyz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconsumed_payload_reads_empty_after_delay() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=xyz");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(receiver.consume().is_none());
        assert!(receiver.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_delivers_exactly_once() {
        let hub = hub();
        let first = hub.subscribe();
        let second = hub.subscribe();

        hub.on_external_redirect("duckee://mint?data=confirmed");

        let taken = first.take().expect("pending redirect");
        assert_eq!(taken.payload.as_deref(), Some("confirmed"));
        assert!(first.take().is_none());
        assert!(second.take().is_none());
        assert!(second.consume().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consume_does_not_clear() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=xyz");
        assert_eq!(receiver.consume().as_deref(), Some("xyz"));
        assert_eq!(receiver.consume().as_deref(), Some("xyz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_redirect_overwrites_unconsumed() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=old");
        hub.on_external_redirect("duckee://auth?data=new");

        assert_eq!(receiver.consume().as_deref(), Some("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_keeps_newer_redirect() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=old");
        tokio::time::sleep(Duration::from_millis(300)).await;
        hub.on_external_redirect("duckee://auth?data=new");
        tokio::time::sleep(Duration::from_millis(300)).await;

        // First timer fired at 500ms but targeted the older generation.
        assert_eq!(receiver.consume().as_deref(), Some("new"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(receiver.consume().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_consumer_loses_payload_to_timer() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=late");
        // The consumer only gets around to reading after the delay.
        tokio::time::sleep(Duration::from_millis(750)).await;

        assert!(receiver.take().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acknowledge_clears_matching_generation_only() {
        let hub = DeeplinkHub::new(DeeplinkSettings {
            auto_clear_ms: 0,
            ..DeeplinkSettings::default()
        });
        let receiver = hub.subscribe();

        let old = hub.on_external_redirect("duckee://auth?data=old").unwrap();
        let new = hub.on_external_redirect("duckee://auth?data=new").unwrap();

        assert!(!receiver.acknowledge(old));
        assert_eq!(receiver.consume().as_deref(), Some("new"));
        assert!(receiver.acknowledge(new));
        assert!(receiver.consume().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_disabled_keeps_payload() {
        let hub = DeeplinkHub::new(DeeplinkSettings {
            auto_clear_ms: 0,
            ..DeeplinkSettings::default()
        });
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=xyz");
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(receiver.consume().as_deref(), Some("xyz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_redirect_clears_slot() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=xyz");
        assert!(hub.on_external_redirect("").is_none());

        assert!(receiver.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_or_encoded_payload() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?other=1");
        let pending = receiver.current().unwrap();
        assert!(pending.payload.is_none());

        hub.on_external_redirect("duckee://auth?data=%7B%22idToken%22%3A%22t%22%7D");
        assert_eq!(receiver.consume().as_deref(), Some("{\"idToken\":\"t\"}"));

        hub.on_external_redirect("not a uri");
        assert!(receiver.current().unwrap().payload.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_waits_for_redirect() {
        let hub = hub();
        let mut receiver = hub.subscribe();

        let waiter = tokio::spawn(async move { receiver.next().await });
        tokio::task::yield_now().await;
        hub.on_external_redirect("duckee://auth?data=xyz");

        let pending = waiter.await.unwrap().unwrap();
        assert_eq!(pending.payload.as_deref(), Some("xyz"));
        assert!(hub.subscribe().current().is_none());
    }

    #[test]
    fn test_redirect_without_runtime_is_kept() {
        let hub = hub();
        let receiver = hub.subscribe();

        hub.on_external_redirect("duckee://auth?data=xyz");
        assert_eq!(receiver.consume().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_external_flow_url() {
        let url = external_flow_url(
            "https://with-solana.duckee.xyz/transact/mint",
            "data",
            "{\"prompt\":\"a duck\"}",
        )
        .unwrap();
        assert!(url.starts_with("https://with-solana.duckee.xyz/transact/mint?data="));

        let parsed = Url::parse(&url).unwrap();
        let (_, value) = parsed.query_pairs().next().unwrap();
        assert_eq!(value, "{\"prompt\":\"a duck\"}");

        assert!(matches!(
            external_flow_url("not a url", "data", "x"),
            Err(ClientError::Config(_))
        ));
    }
}
