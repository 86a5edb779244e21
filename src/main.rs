//! A backlight selection indicator: an 11-step brightness menu kept in
//! sync with the brightness the system actually has.

mod config;
mod external;
mod indicator;
mod provider;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;

use config::{Backend, Config};
use external::dbus::{Bus, ConnectionFactory};
use indicator::{menu::Menu, remote::RemoteMenu, sync::SelectionSync, Indicator};
use provider::{backlight::BacklightProvider, power_daemon::PowerDaemonProvider, BrightnessProvider};

#[derive(Parser)]
#[clap(version, about)]
struct Options {
    /// Path to the configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log specification, in the format understood by flexi_logger
    #[clap(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::parse();
    let _logger = flexi_logger::Logger::try_with_str(&options.log_level)?.start()?;
    log_panics::init();

    let config = Config::load(options.config.as_deref())?;
    let mut connections = ConnectionFactory::new();

    // Construction order is deliberate: bus connection first, then the
    // provider on top of it, then everything that needs the provider.
    match config.backend {
        Backend::Backlight => {
            let connection = connections
                .get(Bus::System)
                .await
                .context("couldn't connect to the system bus")?;
            let provider = BacklightProvider::new(
                &config.backlight.device,
                connection,
                Duration::from_secs(config.backlight.poll_interval_seconds),
            )
            .await
            .context("couldn't open the backlight device")?;
            run(provider).await
        }
        Backend::PowerDaemon => {
            let connection = connections
                .get(Bus::Session)
                .await
                .context("couldn't connect to the session bus")?;
            let provider = PowerDaemonProvider::new(&connection)
                .await
                .context("couldn't reach the power daemon")?;
            run(provider).await
        }
    }
}

/// Wires the menu, the synchronization loop and the remote menu surface
/// together and runs until interrupted.
async fn run<B: BrightnessProvider + 'static>(provider: B) -> Result<()> {
    let (menu, activations) = Menu::new();
    let (sync, selection) = SelectionSync::new(provider);
    let indicator = Indicator::new(sync, activations);
    let mut remote = RemoteMenu::new(menu, selection).serve().await?;
    let indicator_task = tokio::spawn(indicator.run());

    tokio::signal::ctrl_c().await?;
    log::info!("Interrupted, shutting down");
    // Dropping the bus object drops the menu with it, which closes the
    // activation channel and lets the indicator loop finish its teardown.
    remote.stop();
    indicator_task.await??;
    Ok(())
}
