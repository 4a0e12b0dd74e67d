//! Platform brightness backend abstraction.
//!
//! The engine only ever talks to the `BrightnessBackend` trait; the concrete
//! implementation is chosen at startup. Linux sysfs backlight is the only
//! production backend. Backend failures (no compatible device, write errors)
//! are soft: the applier reports them as warnings and retries next cycle.

pub mod sysfs;

use anyhow::Result;

/// Platform primitive that pushes a backlight percentage to the hardware.
#[cfg_attr(test, mockall::automock)]
pub trait BrightnessBackend: Send {
    /// Set the display brightness, 0-100 percent.
    fn set_brightness(&mut self, percent: u8) -> Result<()>;

    /// Human-readable backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// Detect and create the brightness backend for this machine.
pub fn detect_backend(debug_enabled: bool) -> Result<Box<dyn BrightnessBackend>> {
    let backend = sysfs::SysfsBacklight::new(debug_enabled)?;
    Ok(Box::new(backend))
}
