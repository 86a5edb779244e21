//! Keeps the menu selection and the provider's brightness value in
//! agreement without feedback loops.

use std::fmt;

use tokio::sync::watch;

use crate::provider::{BrightnessProvider, ProviderError, RawBrightness, Subscription};

/// One of the 11 selectable brightness steps (0%, 10%, ..., 100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscreteLevel(u8);

impl DiscreteLevel {
    /// Number of selectable steps.
    pub const COUNT: u8 = 11;

    /// The level at the given menu position, if there is one.
    pub fn new(index: u8) -> Option<DiscreteLevel> {
        if index < Self::COUNT {
            Some(DiscreteLevel(index))
        } else {
            None
        }
    }

    /// The level closest to a raw brightness value.
    ///
    /// Ties round away from zero: 95 maps to 100%, 25 maps to 30%.
    /// Values above 100 clamp to 100%.
    pub fn nearest(raw: RawBrightness) -> DiscreteLevel {
        DiscreteLevel(((raw as f64 / 10.0).round() as u8).min(Self::COUNT - 1))
    }

    /// The menu position of this level.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The raw brightness this level stands for.
    pub fn raw(self) -> RawBrightness {
        self.0 as RawBrightness * 10
    }

    /// All levels, in menu order.
    pub fn all() -> impl Iterator<Item = DiscreteLevel> {
        (0..Self::COUNT).map(DiscreteLevel)
    }
}

impl fmt::Display for DiscreteLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.raw())
    }
}

/// Reconciles the two independent writers of the current selection — the
/// user activating a menu entry and the provider reporting an outside
/// change.
///
/// The active selection is published on a [watch] channel for whoever
/// renders the menu; `None` means nothing is selected, which is both the
/// initial state and the fallback after a failed write.
pub struct SelectionSync<B: BrightnessProvider> {
    provider: B,
    state: Option<DiscreteLevel>,
    selection: watch::Sender<Option<DiscreteLevel>>,
    subscription: Option<Subscription>,
}

impl<B: BrightnessProvider> SelectionSync<B> {
    /// Creates the synchronizer in the "nothing selected" state, returning
    /// the receiving end of the selection channel alongside it.
    pub fn new(provider: B) -> (SelectionSync<B>, watch::Receiver<Option<DiscreteLevel>>) {
        let (selection, receiver) = watch::channel(None);
        (
            SelectionSync {
                provider,
                state: None,
                selection,
                subscription: None,
            },
            receiver,
        )
    }

    /// Reads the provider once, adopts the value read as the selection and
    /// registers for change notifications.
    pub async fn start(&mut self) -> Result<(), ProviderError> {
        let raw = self.provider.get_brightness().await?;
        self.initialize(raw);
        self.subscription = Some(self.provider.subscribe().await?);
        Ok(())
    }

    /// Makes the provider's startup value the active selection.
    ///
    /// Deliberately performs no provider call: writing back a value we just
    /// read would only generate a pointless set, or worse, a loop.
    pub fn initialize(&mut self, initial_raw: RawBrightness) {
        let level = DiscreteLevel::nearest(initial_raw);
        log::debug!("Initial brightness {}% selects {}", initial_raw, level);
        self.state = Some(level);
        self.publish();
    }

    /// Handles the user activating a menu entry.
    ///
    /// Re-selecting the already active level is a no-op with zero provider
    /// traffic; anything else issues exactly one write. When the write
    /// fails, no selection stays active and the error goes to the caller.
    pub async fn on_user_select(&mut self, level: DiscreteLevel) -> Result<(), ProviderError> {
        if self.state == Some(level) {
            log::debug!("{} is already selected", level);
            return Ok(());
        }
        match self.provider.set_brightness(level.raw()).await {
            Ok(()) => {
                log::info!("Brightness set to {}", level);
                self.state = Some(level);
                self.publish();
                Ok(())
            }
            Err(e) => {
                self.state = None;
                self.publish();
                Err(e)
            }
        }
    }

    /// Handles a change notification from the provider.
    ///
    /// Only ever moves the local selection; answering a notification with a
    /// set would ping-pong with the provider indefinitely.
    pub fn on_provider_notify(&mut self, raw: RawBrightness) {
        let nearest = DiscreteLevel::nearest(raw);
        if self.state == Some(nearest) {
            return;
        }
        log::info!("Brightness became {}% outside the menu, selecting {}", raw, nearest);
        self.state = Some(nearest);
        self.publish();
    }

    /// Waits for the next provider notification. Resolves to `None` when
    /// there is nothing to wait on: never subscribed, torn down, or the
    /// provider's notification source went away.
    pub async fn next_notification(&mut self) -> Option<RawBrightness> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.changed().await,
            None => None,
        }
    }

    /// The currently selected level.
    pub fn selected(&self) -> Option<DiscreteLevel> {
        self.state
    }

    /// Releases the provider subscription. Safe to call any number of
    /// times, including when [start](Self::start) failed partway through.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.unsubscribe();
        }
        self.subscription = None;
    }

    fn publish(&self) {
        self.selection.send_replace(self.state);
    }
}
