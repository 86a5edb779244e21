use std::collections::HashMap;

use log::info;
use zbus;

/// One of the two standard D-Bus buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    System,
    Session,
}

/// Handles initialization and cloning of [zbus::Connection]s. These are
/// clone-able and handle their own refcounts internally, so each bus is
/// opened at most once and clones are handed out afterwards.
pub struct ConnectionFactory {
    connections: HashMap<Bus, zbus::Connection>,
}

impl ConnectionFactory {
    /// Create a new ConnectionFactory.
    ///
    /// No connections are created upon calling this method.
    pub fn new() -> ConnectionFactory {
        ConnectionFactory {
            connections: HashMap::new(),
        }
    }

    /// Get a connection to the given bus
    pub async fn get(&mut self, bus: Bus) -> zbus::Result<zbus::Connection> {
        if let Some(connection) = self.connections.get(&bus) {
            return Ok(connection.clone());
        }
        info!("Creating a new connection to the {:?} bus", bus);
        let connection = match bus {
            Bus::System => zbus::Connection::system().await?,
            Bus::Session => zbus::Connection::session().await?,
        };
        self.connections.insert(bus, connection.clone());
        Ok(connection)
    }
}
