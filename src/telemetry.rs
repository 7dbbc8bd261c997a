use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. `RUST_LOG` selects the levels;
/// without it everything at `info` and above is shown.
pub fn init() {
    setup_console();

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives.as_deref()))
        .with_ansi(true)
        .init();
}

fn env_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Switches the Windows console to UTF-8 with ANSI escape handling.
#[cfg(windows)]
fn setup_console() {
    use windows_sys::Win32::System::Console::{
        GetConsoleMode, GetStdHandle, SetConsoleMode, SetConsoleOutputCP,
        ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_OUTPUT_HANDLE,
    };
    const CP_UTF8: u32 = 65001;

    // SAFETY: plain Win32 calls on the process's own stdout handle.
    unsafe {
        SetConsoleOutputCP(CP_UTF8);
        let handle = GetStdHandle(STD_OUTPUT_HANDLE);
        let mut mode = 0;
        if GetConsoleMode(handle, &mut mode) != 0 {
            SetConsoleMode(handle, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING);
        }
    }
}

#[cfg(not(windows))]
fn setup_console() {}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;
    use tracing_subscriber::prelude::*;

    fn enabled_under(directives: Option<&str>) -> (bool, bool) {
        let subscriber = tracing_subscriber::registry().with(env_filter(directives));
        tracing::subscriber::with_default(subscriber, || {
            (
                tracing::enabled!(Level::DEBUG),
                tracing::enabled!(Level::INFO),
            )
        })
    }

    #[test]
    fn rust_log_selects_levels_over_info_default() {
        assert_eq!(enabled_under(None), (false, true));
        assert_eq!(enabled_under(Some("")), (false, true));
        assert_eq!(enabled_under(Some("debug")), (true, true));
        assert_eq!(enabled_under(Some("warn")), (false, false));
    }
}
