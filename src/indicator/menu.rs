//! The 11-entry brightness menu, as a model with no toolkit attached.

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;

use super::sync::DiscreteLevel;

/// A single selectable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub level: DiscreteLevel,
    pub label: String,
}

/// The ordered list of brightness menu entries.
///
/// Entries are built once, in menu order, and activation passes the level
/// explicitly — there is no per-item callback state that could end up
/// bound to the wrong entry.
pub struct Menu {
    items: Vec<MenuItem>,
    activations: mpsc::Sender<DiscreteLevel>,
}

impl Menu {
    /// Builds the menu, returning it together with the receiving end of
    /// its activation channel.
    pub fn new() -> (Menu, mpsc::Receiver<DiscreteLevel>) {
        let (activations, receiver) = mpsc::channel(8);
        let items = DiscreteLevel::all()
            .map(|level| MenuItem {
                level,
                label: level.to_string(),
            })
            .collect();
        (Menu { items, activations }, receiver)
    }

    /// All entries, in menu order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// The entry displaying the given level.
    pub fn item_for(&self, level: DiscreteLevel) -> &MenuItem {
        &self.items[level.index()]
    }

    /// Reports that the user activated the entry for `level`.
    pub async fn activate(&self, level: DiscreteLevel) -> Result<()> {
        self.activations
            .send(level)
            .await
            .map_err(|_| anyhow!("the indicator loop is gone"))
    }
}
