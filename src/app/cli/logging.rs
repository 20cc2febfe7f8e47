//! Diagnostic output setup.

use std::env;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log level when `RUST_LOG` is unset.
const LOG_ENV: &str = "TFMART_LOG";

/// Install the stderr subscriber. Later calls are no-ops.
pub(super) fn init(verbose: bool) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = match env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => {
                let level = if verbose {
                    "debug".to_string()
                } else {
                    env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_string())
                };
                EnvFilter::try_new(format!("tfmart={},hyper=warn,reqwest=warn", level))
                    .unwrap_or_else(|_| EnvFilter::new("tfmart=warn"))
            }
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}
