use zbus::dbus_proxy;

/// The backlight surface of gnome-settings-daemon's power plugin.
#[dbus_proxy(
    interface = "org.gnome.SettingsDaemon.Power.Screen",
    default_service = "org.gnome.SettingsDaemon.Power",
    default_path = "/org/gnome/SettingsDaemon/Power"
)]
pub trait Screen {
    /// Current brightness as a percentage; -1 when no backlight exists.
    #[dbus_proxy(property)]
    fn brightness(&self) -> zbus::Result<i32>;

    #[dbus_proxy(property)]
    fn set_brightness(&self, value: i32) -> zbus::Result<()>;
}
