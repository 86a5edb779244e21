//! The session-bus face of the menu, standing in for a tray frontend.

use anyhow::Result;
use tokio::sync::{oneshot, watch};

use super::{menu::Menu, sync::DiscreteLevel};

const OBJECT_PATH: &str = "/org/lucerna/Indicator";

/// Serves the menu on the session bus: one method to activate an entry,
/// one to ask what's currently selected. A toolkit frontend would sit on
/// the same two seams.
pub struct RemoteMenu {
    menu: Menu,
    selection: watch::Receiver<Option<DiscreteLevel>>,
}

/// Controls the lifetime of a served [RemoteMenu].
pub struct RemoteHandle {
    stop: Option<oneshot::Sender<()>>,
}

impl RemoteHandle {
    /// Unregisters the bus object. Idempotent.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for RemoteHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl RemoteMenu {
    pub fn new(menu: Menu, selection: watch::Receiver<Option<DiscreteLevel>>) -> RemoteMenu {
        RemoteMenu { menu, selection }
    }

    /// Claims org.lucerna.Indicator1 on the session bus and serves the
    /// menu there until the returned handle is stopped or dropped.
    pub async fn serve(self) -> Result<RemoteHandle> {
        let (stop_sender, stop_receiver) = oneshot::channel();
        let connection = zbus::ConnectionBuilder::session()?
            .name("org.lucerna.Indicator1")?
            .serve_at(OBJECT_PATH, self)?
            .build()
            .await?;

        log::debug!("Bound to D-Bus");
        tokio::spawn(async move {
            let moved_connection = connection;
            let _ = stop_receiver.await;
            if let Err(e) = moved_connection
                .object_server()
                .remove::<RemoteMenu, _>(OBJECT_PATH)
                .await
            {
                log::error!("Failed to unregister the menu object: {}", e);
            }
            log::debug!("Remote menu terminated");
        });
        Ok(RemoteHandle {
            stop: Some(stop_sender),
        })
    }
}

#[zbus::dbus_interface(name = "org.lucerna.Indicator1")]
impl RemoteMenu {
    /// Activates the menu entry at the given position (0 through 10).
    async fn select_level(&self, index: u32) -> zbus::fdo::Result<()> {
        let level = u8::try_from(index)
            .ok()
            .and_then(DiscreteLevel::new)
            .ok_or_else(|| {
                zbus::fdo::Error::InvalidArgs(format!("no menu entry with index {}", index))
            })?;
        self.menu
            .activate(level)
            .await
            .map_err(|e| zbus::fdo::Error::Failed(format!("{}", e)))
    }

    /// The label of the selected entry, or an empty string when nothing
    /// is selected.
    fn current_label(&self) -> String {
        match *self.selection.borrow() {
            Some(level) => self.menu.item_for(level).label.clone(),
            None => String::new(),
        }
    }
}
