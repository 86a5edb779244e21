//! Plumbing for the system services the providers talk to

pub mod dbus;
pub mod gsd_power;
pub mod login1;
