//! Test doubles for the notification seams.
//!
//! These mocks implement the crate's own `ChannelAdapter` and `RetryQueue`
//! traits, so they must live in this crate to avoid a dev-dependency cycle
//! (a downstream test-utils crate that depended back on `assay-notify` would
//! implement the traits against a *separate* build of this crate). They are
//! compiled only under `cfg(test)` or the `test-util` feature.

use crate::{ChannelAdapter, DeferredItem, RenderedMessage, RetryItem, RetryQueue};
use assay_core::{AssayResult, Channel, ChannelError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// When a [`MockChannelAdapter`] should report a delivery failure.
pub enum FailureMode {
    Never,
    Always,
    /// Fail only for recipients containing this substring.
    Matching(String),
}

/// Channel adapter with injectable failures and delivery counters.
pub struct MockChannelAdapter {
    channel: Channel,
    failure: FailureMode,
    sent: AtomicUsize,
    failed: AtomicUsize,
}

impl MockChannelAdapter {
    /// Adapter that delivers everything.
    pub fn reliable(channel: Channel) -> Self {
        Self {
            channel,
            failure: FailureMode::Never,
            sent: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Adapter that fails every delivery.
    pub fn failing(channel: Channel) -> Self {
        Self {
            channel,
            failure: FailureMode::Always,
            sent: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Adapter that fails deliveries whose recipient contains `fragment`.
    pub fn failing_for(channel: Channel, fragment: &str) -> Self {
        Self {
            channel,
            failure: FailureMode::Matching(fragment.to_string()),
            sent: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn failed_count(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelAdapter for MockChannelAdapter {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, recipient: &str, _message: &RenderedMessage) -> Result<(), ChannelError> {
        let fail = match &self.failure {
            FailureMode::Never => false,
            FailureMode::Always => true,
            FailureMode::Matching(fragment) => recipient.contains(fragment.as_str()),
        };
        if fail {
            self.failed.fetch_add(1, Ordering::SeqCst);
            Err(ChannelError::DeliveryFailed {
                channel: self.channel,
                recipient: recipient.to_string(),
                reason: "injected failure".to_string(),
            })
        } else {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

/// Retry queue that records everything handed to it.
#[derive(Default)]
pub struct RecordingRetryQueue {
    retries: Mutex<Vec<RetryItem>>,
    deferred: Mutex<Vec<DeferredItem>>,
}

impl RecordingRetryQueue {
    pub fn retry_count(&self) -> usize {
        self.retries.lock().unwrap().len()
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.lock().unwrap().len()
    }

    pub fn retries(&self) -> Vec<RetryItem> {
        self.retries.lock().unwrap().clone()
    }

    pub fn deferred(&self) -> Vec<DeferredItem> {
        self.deferred.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetryQueue for RecordingRetryQueue {
    async fn enqueue_retry(&self, item: RetryItem) -> AssayResult<()> {
        self.retries.lock().unwrap().push(item);
        Ok(())
    }

    async fn enqueue_deferred(&self, item: DeferredItem) -> AssayResult<()> {
        self.deferred.lock().unwrap().push(item);
        Ok(())
    }
}
