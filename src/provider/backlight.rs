use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use tokio::{
    fs,
    io::AsyncReadExt,
    sync::{oneshot, watch},
    time,
};

use super::{BrightnessProvider, ProviderError, RawBrightness, Subscription};
use crate::external::login1::SessionProxy;

/// A [BrightnessProvider] backed by the kernel's /sys/class/backlight
/// device class, the store where the system itself keeps the brightness.
///
/// The brightness is read directly from the filesystem but writing is
/// mediated via logind Session's SetBrightness method, to allow root-less
/// brightness setting. Changes made by other writers are picked up by
/// polling the device's brightness file.
pub struct BacklightProvider {
    device: String,
    device_path: PathBuf,
    max_brightness: u32,
    poll_interval: Duration,
    proxy: SessionProxy<'static>,
    subscribed: Arc<AtomicBool>,
}

impl BacklightProvider {
    /// Create a new provider for the device under
    /// /sys/class/backlight/{device}.
    pub async fn new(
        device: &str,
        connection: zbus::Connection,
        poll_interval: Duration,
    ) -> Result<BacklightProvider, ProviderError> {
        let proxy = SessionProxy::new(&connection)
            .await
            .map_err(ProviderError::from_zbus)?;
        let device_path = PathBuf::from(format!("/sys/class/backlight/{}", device));
        let max_brightness = read_number_from_file(device_path.join("max_brightness"))
            .await
            .map_err(|e| ProviderError::Unavailable(e.into()))?;
        Ok(BacklightProvider {
            device: device.to_string(),
            device_path,
            max_brightness,
            poll_interval,
            proxy,
            subscribed: Arc::new(AtomicBool::new(false)),
        })
    }

    async fn read_percentage(&self) -> Result<RawBrightness, ProviderError> {
        let device_raw = read_number_from_file(self.device_path.join("brightness"))
            .await
            .map_err(|e| ProviderError::Unavailable(e.into()))?;
        Ok(percentage_from_device(device_raw, self.max_brightness))
    }
}

#[async_trait]
impl BrightnessProvider for BacklightProvider {
    async fn get_brightness(&self) -> Result<RawBrightness, ProviderError> {
        self.read_percentage().await
    }

    async fn set_brightness(&self, value: RawBrightness) -> Result<(), ProviderError> {
        let clamped = value.min(100);
        let device_raw = (self.max_brightness as f64 * (clamped as f64 / 100.0)).round() as u32;
        self.proxy
            .set_brightness("backlight", &self.device, device_raw)
            .await
            .map_err(ProviderError::from_zbus)
    }

    async fn subscribe(&self) -> Result<Subscription, ProviderError> {
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(ProviderError::AlreadySubscribed);
        }
        let current = match self.read_percentage().await {
            Ok(percentage) => percentage,
            Err(e) => {
                self.subscribed.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let (updates_sender, updates_receiver) = watch::channel(current);
        let (cancel_sender, mut cancel_receiver) = oneshot::channel();
        let brightness_file = self.device_path.join("brightness");
        let device = self.device.clone();
        let max_brightness = self.max_brightness;
        let poll_interval = self.poll_interval;
        let subscribed = self.subscribed.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(poll_interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            let mut last = current;
            loop {
                tokio::select! {
                    _ = &mut cancel_receiver => break,
                    _ = updates_sender.closed() => break,
                    _ = ticker.tick() => {
                        match read_number_from_file(&brightness_file).await {
                            Ok(device_raw) => {
                                let percentage = percentage_from_device(device_raw, max_brightness);
                                if percentage != last {
                                    log::debug!(
                                        "Backlight {} changed to {}% outside our control",
                                        device,
                                        percentage
                                    );
                                    last = percentage;
                                    let _ = updates_sender.send(percentage);
                                }
                            }
                            Err(e) => {
                                log::warn!("Couldn't poll backlight {}: {}", device, e);
                            }
                        }
                    }
                }
            }
            subscribed.store(false, Ordering::SeqCst);
            log::debug!("Backlight watcher for {} stopped", device);
        });

        Ok(Subscription::new(updates_receiver, cancel_sender))
    }
}

fn percentage_from_device(device_raw: u32, max_brightness: u32) -> RawBrightness {
    if max_brightness == 0 {
        return 0;
    }
    ((device_raw as f64 / max_brightness as f64) * 100.0).round() as RawBrightness
}

async fn read_number_from_file(path: impl AsRef<Path>) -> Result<u32> {
    let mut f = fs::File::open(path).await?;
    let mut contents = String::new();
    f.read_to_string(&mut contents).await?;
    Ok(contents.trim().parse()?)
}
