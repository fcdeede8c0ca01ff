//! Installs the global `tracing` subscriber once at process entry.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber with an `EnvFilter`. `verbosity` is the
/// number of times `-v` was repeated on the command line; each step lowers
/// the default level one notch when `RUST_LOG` isn't set.
pub fn init(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "tuscan=warn",
        1 => "tuscan=info",
        2 => "tuscan=debug",
        _ => "tuscan=trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Installs a subscriber honoring `RUST_LOG`, ignoring the "already
/// installed" error so tests can call it freely.
#[cfg(test)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
