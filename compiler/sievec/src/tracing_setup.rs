//! Tracing subscriber for the `sieve` binary.

use std::sync::{Once, OnceLock};

use tracing_subscriber::{reload, EnvFilter, Registry};

static TRACING_INIT: Once = Once::new();
static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

fn level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins when set; otherwise
/// `verbose` selects `debug` over `info`. Safe to call more than once.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose)));
        let (filter, handle) = reload::Layer::new(filter);
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(verbose)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .try_init();
        match installed {
            Ok(()) => {
                let _ = FILTER.set(handle);
            }
            Err(_) => tracing::debug!("a tracing subscriber was already installed"),
        }
    });
}

/// Change the default level after [`init_tracing`], e.g. once config
/// files have been read. Does nothing when `RUST_LOG` is set.
pub fn set_verbose(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    let Some(handle) = FILTER.get() else {
        return;
    };
    if let Err(err) = handle.reload(EnvFilter::new(level(verbose))) {
        tracing::warn!(%err, "could not change the log level");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_can_be_raised_after_init() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        init_tracing(false);
        assert!(!tracing::enabled!(tracing::Level::DEBUG));
        set_verbose(true);
        assert!(tracing::enabled!(tracing::Level::DEBUG));
    }
}
