use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root JSON logger, writing to standard error.
///
/// With the `env_logging` feature, records are filtered according to
/// `RUST_LOG` before they reach the asynchronous drain.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);

    #[cfg(feature = "env_logging")]
    let drain = slog_envlogger::new(drain).fuse();

    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}

/// A logger that drops everything. Useful in tests.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}
