use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio_stream::StreamExt;

use super::{BrightnessProvider, ProviderError, RawBrightness, Subscription};
use crate::external::gsd_power::ScreenProxy;

/// A [BrightnessProvider] which delegates everything to the desktop's
/// power management service (the Screen interface of
/// org.gnome.SettingsDaemon.Power on the session bus).
///
/// The service reports brightness as a percentage already and emits
/// property change notifications, so this backend is a thin proxy.
pub struct PowerDaemonProvider {
    proxy: ScreenProxy<'static>,
    subscribed: Arc<AtomicBool>,
}

impl PowerDaemonProvider {
    /// Create a new provider talking over the given session bus connection.
    pub async fn new(connection: &zbus::Connection) -> Result<PowerDaemonProvider, ProviderError> {
        let proxy = ScreenProxy::new(connection)
            .await
            .map_err(ProviderError::from_zbus)?;
        Ok(PowerDaemonProvider {
            proxy,
            subscribed: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[async_trait]
impl BrightnessProvider for PowerDaemonProvider {
    async fn get_brightness(&self) -> Result<RawBrightness, ProviderError> {
        let value = self
            .proxy
            .brightness()
            .await
            .map_err(ProviderError::from_zbus)?;
        // The daemon reports -1 when no backlight is present.
        if value < 0 {
            return Err(ProviderError::Unavailable(
                format!("power daemon reports no backlight (brightness {})", value).into(),
            ));
        }
        Ok((value as RawBrightness).min(100))
    }

    async fn set_brightness(&self, value: RawBrightness) -> Result<(), ProviderError> {
        self.proxy
            .set_brightness(value.min(100) as i32)
            .await
            .map_err(ProviderError::from_zbus)
    }

    async fn subscribe(&self) -> Result<Subscription, ProviderError> {
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(ProviderError::AlreadySubscribed);
        }
        let current = match self.get_brightness().await {
            Ok(percentage) => percentage,
            Err(e) => {
                self.subscribed.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let mut stream = self.proxy.receive_brightness_changed().await;
        let (updates_sender, updates_receiver) = watch::channel(current);
        let (cancel_sender, mut cancel_receiver) = oneshot::channel();
        let subscribed = self.subscribed.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut cancel_receiver => break,
                    _ = updates_sender.closed() => break,
                    Some(change) = stream.next() => {
                        match change.get().await {
                            Ok(value) if value >= 0 => {
                                log::debug!("Power daemon reports brightness {}%", value);
                                let _ = updates_sender.send((value as RawBrightness).min(100));
                            }
                            Ok(value) => {
                                log::warn!("Power daemon reports brightness {}, ignoring", value);
                            }
                            Err(e) => {
                                log::error!("Fetching brightness from change notification failed: {}", e);
                            }
                        }
                    }
                }
            }
            subscribed.store(false, Ordering::SeqCst);
            log::debug!("Power daemon watcher stopped");
        });

        Ok(Subscription::new(updates_receiver, cancel_sender))
    }
}
