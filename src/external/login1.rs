use zbus::dbus_proxy;

/// The single logind session method we need. The `session/auto` object
/// resolves to the caller's own session on current logind versions, so no
/// session lookup is necessary.
#[dbus_proxy(
    interface = "org.freedesktop.login1.Session",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1/session/auto"
)]
pub trait Session {
    /// Sets the brightness of a device belonging to the session's seat.
    fn set_brightness(&self, subsystem: &str, name: &str, brightness: u32) -> zbus::Result<()>;
}
