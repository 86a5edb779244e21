//! Access to the system's brightness setting.
//!
//! Every backend presents the same three-operation contract: read the
//! current value, write a new one and subscribe to changes made by someone
//! else. The rest of the program only ever sees [BrightnessProvider].

pub mod backlight;
pub mod mock;
pub mod power_daemon;


use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{oneshot, watch};

/// A brightness percentage in [0, 100], the unit all providers speak.
pub type RawBrightness = u32;

/// An error returned by a [BrightnessProvider].
///
/// Out-of-range values are never an error on this seam; callers clamp
/// before writing and round after reading.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backend cannot be reached.
    #[error("brightness backend unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend refused a write.
    #[error("brightness change rejected: {0}")]
    PermissionDenied(String),

    /// A provider instance supports one active subscription at a time.
    #[error("provider already has an active subscription")]
    AlreadySubscribed,
}

impl ProviderError {
    /// Maps a bus error onto the provider error kinds. Access-denied
    /// replies become [ProviderError::PermissionDenied], everything else
    /// means the backend is effectively unreachable.
    pub(crate) fn from_zbus(error: zbus::Error) -> ProviderError {
        match &error {
            zbus::Error::FDO(fdo_error) => {
                if let zbus::fdo::Error::AccessDenied(message) = fdo_error.as_ref() {
                    return ProviderError::PermissionDenied(message.clone());
                }
            }
            zbus::Error::MethodError(name, message, _) => {
                if name.as_str() == "org.freedesktop.DBus.Error.AccessDenied" {
                    return ProviderError::PermissionDenied(
                        message.clone().unwrap_or_default(),
                    );
                }
            }
            _ => {}
        }
        ProviderError::Unavailable(Box::new(error))
    }
}

/// A source of display brightness, real or mocked.
#[async_trait]
pub trait BrightnessProvider: Send + Sync {
    /// The current brightness.
    async fn get_brightness(&self) -> Result<RawBrightness, ProviderError>;

    /// Sets the brightness. Callers are expected to pass a value in
    /// [0, 100]; backends clamp rather than reject.
    async fn set_brightness(&self, value: RawBrightness) -> Result<(), ProviderError>;

    /// Registers for change notifications. At most one subscription can be
    /// active per provider instance.
    async fn subscribe(&self) -> Result<Subscription, ProviderError>;
}

/// An active registration for brightness change notifications.
///
/// Dropping the subscription cancels it; [unsubscribe](Self::unsubscribe)
/// does the same explicitly and may be called any number of times.
#[derive(Debug)]
pub struct Subscription {
    updates: watch::Receiver<RawBrightness>,
    cancel: Option<oneshot::Sender<()>>,
}

impl Subscription {
    /// Wraps the update channel and the cancellation sender a backend's
    /// watcher task listens on.
    pub fn new(
        updates: watch::Receiver<RawBrightness>,
        cancel: oneshot::Sender<()>,
    ) -> Subscription {
        Subscription {
            updates,
            cancel: Some(cancel),
        }
    }

    /// Waits for the next notification. Resolves to `None` once the
    /// subscription was cancelled or the backend's watcher went away.
    pub async fn changed(&mut self) -> Option<RawBrightness> {
        if self.cancel.is_none() {
            return None;
        }
        self.updates.changed().await.ok()?;
        Some(*self.updates.borrow())
    }

    /// Cancels the subscription. Idempotent.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The watcher may already be gone, which is just as cancelled.
            let _ = cancel.send(());
        }
    }
}
