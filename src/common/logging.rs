//! Minimal stderr logger for `-v1`/`-v2` (spec §6, SPEC_FULL §10.2).
//!
//! `-v1` wants one summary line after evaluation; `-v2` wants one line per
//! GC cycle, in the exact form `"GC: alive / heap_size"`. Both are pinned
//! text, so this logger prints `record.args()` verbatim with no level or
//! target prefix — the opposite of what `env_logger` would do.

use log::{LevelFilter, Log, Metadata, Record};

pub struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Verbosity requested on the command line (spec §6: `-v0`/`-v1`/`-v2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Stats,
    Trace,
}

impl Verbosity {
    fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Stats => LevelFilter::Info,
            Verbosity::Trace => LevelFilter::Debug,
        }
    }
}

/// `-v1` summary lines are logged at `Info`, `-v2` GC-cycle lines at
/// `Debug`, so `Trace` verbosity also implies every `-v1` line fires.
pub fn init(verbosity: Verbosity) {
    static LOGGER: StderrLogger = StderrLogger;
    log::set_max_level(verbosity.level_filter());
    // Only fails if a logger was already installed; in this single-shot
    // CLI that only happens if `init` is called twice, which is a bug in
    // the caller, not a runtime condition to recover from.
    let _ = log::set_logger(&LOGGER);
}
