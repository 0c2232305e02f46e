use std::env;
use std::io::Write;

use log::{self, LevelFilter, Metadata, Record};

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    // stderr, so the sim's JSON on stdout stays parseable
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                std::io::stderr(),
                "{:<5} [{}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: SimpleLogger = SimpleLogger;

/// Install the logger with a level taken from `BATTLESHIP_LOG` (`off`,
/// `error`, `warn`, `info`, `debug`, `trace`). Defaults to `info`; calling
/// it more than once is harmless.
pub fn init_logging() {
    init_logging_with(LevelFilter::Info);
}

/// Like [`init_logging`] with a caller-chosen fallback level.
pub fn init_logging_with(default: LevelFilter) {
    let level = env::var("BATTLESHIP_LOG")
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(default);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}
