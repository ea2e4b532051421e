//! Desktop platform implementation.

use std::time::Duration;

use rand::rngs::ThreadRng;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::error::PlatformError;
use crate::formatter::TickFormatter;

/// Sleeps for the given duration.
///
/// Uses a spin sleeper while the window is focused for accurate frame
/// pacing, and the cheaper OS sleep when it is not.
pub fn sleep(duration: Duration, focused: bool) {
    if focused {
        spin_sleep::sleep(duration);
    } else {
        std::thread::sleep(duration);
    }
}

/// Attaches a console (on Windows) and installs the tracing subscriber.
///
/// Must run before anything logs. The filter defaults to `debug` and can
/// be overridden with `RUST_LOG`.
pub fn init_console(force_console: bool) -> Result<(), PlatformError> {
    #[cfg(windows)]
    attach_console(force_console)?;
    #[cfg(not(windows))]
    let _ = force_console;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(true)
        .with_env_filter(filter)
        .event_format(TickFormatter)
        .finish()
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).map_err(|e| PlatformError::TracingInit(e.to_string()))?;

    Ok(())
}

pub fn rng() -> ThreadRng {
    rand::rng()
}

/// Attach to the parent process console, or allocate a fresh one when
/// `force` is set. Must run before the first write to stdout so the
/// standard handles resolve to the attached console.
///
/// Windows-only; the subsystem is `windows`, so a plain double-click
/// launch has no console at all.
#[cfg(windows)]
fn attach_console(force: bool) -> Result<(), PlatformError> {
    use windows_sys::Win32::System::Console::{AllocConsole, AttachConsole, GetConsoleWindow, ATTACH_PARENT_PROCESS};

    unsafe {
        if !GetConsoleWindow().is_null() {
            return Ok(());
        }
        if AttachConsole(ATTACH_PARENT_PROCESS) != 0 {
            return Ok(());
        }
        if force {
            if AllocConsole() != 0 {
                return Ok(());
            }
            return Err(PlatformError::ConsoleInit("could not attach or allocate a console".to_string()));
        }
    }

    // Detached launch without --console; logs go nowhere, which is fine.
    Ok(())
}
