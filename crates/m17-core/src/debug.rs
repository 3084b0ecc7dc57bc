use std::sync::Once;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt as tracingfmt, EnvFilter};

/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

static INIT_LOG: Once = Once::new();

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"));
}

/// Sets up default logging to stdout, honoring RUST_LOG when set
pub fn setup_logging_default() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    setup_logging(filter);
}

fn setup_logging(filter: EnvFilter) {
    INIT_LOG.call_once(|| {
        let stdout_layer = tracingfmt::layer().with_file(true).with_line_number(true);

        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(filter))
            .init();
    });
}
