use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};

use super::{BrightnessProvider, ProviderError, RawBrightness, Subscription};

/// A mock [BrightnessProvider], usable when testing the components using
/// the trait. Supports failure injection, call counting and faking
/// brightness changes made outside the application.
#[derive(Clone)]
pub struct MockBrightnessProvider {
    percentage: Arc<Mutex<RawBrightness>>,
    should_fail: Arc<AtomicBool>,
    get_calls: Arc<AtomicUsize>,
    set_calls: Arc<AtomicUsize>,
    subscribed: Arc<AtomicBool>,
    notifications: Arc<watch::Sender<RawBrightness>>,
}

impl MockBrightnessProvider {
    /// Create a new provider, with the specified initial brightness
    pub fn new(initial_brightness: RawBrightness) -> MockBrightnessProvider {
        let (notifications, _) = watch::channel(initial_brightness);
        MockBrightnessProvider {
            percentage: Arc::new(Mutex::new(initial_brightness)),
            should_fail: Arc::new(AtomicBool::new(false)),
            get_calls: Arc::new(AtomicUsize::new(0)),
            set_calls: Arc::new(AtomicUsize::new(0)),
            subscribed: Arc::new(AtomicBool::new(false)),
            notifications: Arc::new(notifications),
        }
    }

    /// Set whether operations on this provider should return an error or not
    pub fn set_failure_mode(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Fake a brightness change made outside the application. Reaches any
    /// active subscription but does not touch the stored value, like a
    /// notification coming from a different writer would.
    pub fn emit(&self, raw: RawBrightness) {
        self.notifications.send_replace(raw);
    }

    /// The brightness value the provider currently holds.
    pub fn brightness(&self) -> RawBrightness {
        *self.percentage.lock().unwrap()
    }

    /// How many reads reached this provider, failed ones included.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// How many writes reached this provider, failed ones included.
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Whether a subscription is currently active.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrightnessProvider for MockBrightnessProvider {
    async fn get_brightness(&self) -> Result<RawBrightness, ProviderError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(
                "mock provider is failing".into(),
            ));
        }
        Ok(*self.percentage.lock().unwrap())
    }

    async fn set_brightness(&self, value: RawBrightness) -> Result<(), ProviderError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ProviderError::PermissionDenied(
                "mock provider is failing".to_string(),
            ));
        }
        *self.percentage.lock().unwrap() = value.min(100);
        Ok(())
    }

    async fn subscribe(&self) -> Result<Subscription, ProviderError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(
                "mock provider is failing".into(),
            ));
        }
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(ProviderError::AlreadySubscribed);
        }
        let (cancel_sender, cancel_receiver) = oneshot::channel();
        let subscribed = self.subscribed.clone();
        tokio::spawn(async move {
            // Completes on explicit unsubscription and on subscription drop
            // alike, freeing the slot for the next subscriber.
            let _ = cancel_receiver.await;
            subscribed.store(false, Ordering::SeqCst);
        });
        Ok(Subscription::new(
            self.notifications.subscribe(),
            cancel_sender,
        ))
    }
}
