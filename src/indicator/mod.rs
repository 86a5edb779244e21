//! The indicator itself: the menu model, the synchronization core and the
//! event loop that serializes everything happening to them.

pub mod menu;
pub mod remote;
pub mod sync;

#[cfg(test)]
mod test;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::provider::BrightnessProvider;
use sync::{DiscreteLevel, SelectionSync};

/// Drives a [SelectionSync] from a single task.
///
/// Menu activations and provider notifications arrive on the same
/// `select!` loop and are therefore handled one at a time, never
/// interleaved mid-update.
pub struct Indicator<B: BrightnessProvider> {
    sync: SelectionSync<B>,
    activations: mpsc::Receiver<DiscreteLevel>,
}

impl<B: BrightnessProvider> Indicator<B> {
    pub fn new(
        sync: SelectionSync<B>,
        activations: mpsc::Receiver<DiscreteLevel>,
    ) -> Indicator<B> {
        Indicator { sync, activations }
    }

    /// Runs until the menu's activation channel closes, then releases the
    /// provider subscription.
    ///
    /// A provider that can't even be read at startup doesn't kill the
    /// loop; the menu simply shows no active entry until a selection or a
    /// notification comes through.
    pub async fn run(mut self) -> Result<()> {
        let mut notifications_live = match self.sync.start().await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Couldn't read the initial brightness: {}", e);
                false
            }
        };
        loop {
            tokio::select! {
                activated = self.activations.recv() => match activated {
                    Some(level) => {
                        if let Err(e) = self.sync.on_user_select(level).await {
                            log::error!("Selecting {} failed: {}", level, e);
                        }
                    }
                    None => break,
                },
                notified = self.sync.next_notification(), if notifications_live => match notified {
                    Some(raw) => self.sync.on_provider_notify(raw),
                    None => {
                        log::warn!("Provider notifications ended");
                        notifications_live = false;
                    }
                },
            }
        }
        log::debug!("Menu gone, shutting down");
        self.sync.teardown();
        Ok(())
    }
}
