//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::flow::{Flow, ScreenKey};
use crate::core::surface::Surface;

/// A surface that remembers everything it was asked to show.
pub struct RecordingSurface<C> {
    shown: Arc<Mutex<Vec<C>>>,
}

impl<C: Send + 'static> Surface for RecordingSurface<C> {
    type Content = C;

    fn set_content(&mut self, content: C) {
        self.shown.lock().push(content);
    }
}

/// Creates a recording surface and a handle to its history.
pub fn recording_surface<C>() -> (RecordingSurface<C>, Arc<Mutex<Vec<C>>>) {
    let shown = Arc::new(Mutex::new(Vec::new()));
    (
        RecordingSurface {
            shown: Arc::clone(&shown),
        },
        shown,
    )
}

/// A generator that returns `content` and counts how often it ran.
pub fn counting(
    content: &'static str,
) -> (
    impl Fn() -> &'static str + Send + Sync + 'static,
    Arc<AtomicUsize>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let generator = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        content
    };
    (generator, calls)
}

/// Waits until the flow has committed `key`.
pub async fn settle<K: ScreenKey, C>(flow: &Flow<K, C>, key: K) {
    let mut rx = flow.watch_current();
    let reached = matches!(
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|current| current.as_ref() == Some(&key)),
        )
        .await,
        Ok(Ok(_))
    );
    assert!(reached, "flow never settled on {key:?}");
}
