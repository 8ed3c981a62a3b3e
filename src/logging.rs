use std::sync::Once;

use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter, Registry};

static INIT: Once = Once::new();

/// Initialize logging.  If you set the environment variable `RUST_LOG` to a
/// non-empty value, we install a compact stderr logger filtered by it;
/// otherwise nothing is logged.  Stdout is left alone since that's where the
/// generated script goes.
///
/// Safe to call more than once; only the first call does anything.
pub fn init_logging() {
    INIT.call_once(|| {
        // If RUST_LOG is present and *non-empty* then interpret it and use it.
        // Shell wrappers frequently set RUST_LOG unconditionally but
        // potentially with an empty value, and we don't want that to be
        // interpreted as a desire to enable logging.
        let rustlog = match std::env::var("RUST_LOG") {
            Ok(rustlog) if !rustlog.is_empty() => rustlog,
            _ => return,
        };
        let env_filter = match EnvFilter::try_new(&rustlog) {
            Ok(filter) => filter,
            Err(err) => {
                eprintln!("Ignoring bad RUST_LOG value {:?}: {}", rustlog, err);
                return;
            }
        };

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
            .compact()
            // This ends up in logs, so ANSI isn't helpful.
            .with_ansi(false)
            // We don't care about the wall time that much and it takes up a
            // lot of columns.
            .without_time()
            .with_filter(env_filter);

        // Someone else may have installed a subscriber already (tests).
        let _ = Registry::default().with(layer).try_init();
    });
}
