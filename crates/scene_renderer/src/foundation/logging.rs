//! Logging utilities
//!
//! The renderer logs through the `log` facade; applications pick the sink.
//! `init` wires up `env_logger` for binaries and tools that have no logger of
//! their own.

pub use log::{debug, info, warn, error, trace};

/// Initialize `env_logger`, honoring `RUST_LOG` and falling back to `default_filter`
///
/// Safe to call more than once; later calls are ignored.
pub fn init(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Logger for unit tests that keeps each thread's records
///
/// Tests run on their own threads, so records from parallel tests do not mix.
#[cfg(test)]
pub(crate) mod capture {
    use std::cell::RefCell;
    use std::sync::Once;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    struct CaptureLogger;

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            RECORDS.with(|records| {
                records
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;
    static INSTALL: Once = Once::new();

    thread_local! {
        static RECORDS: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
    }

    /// Install the capture logger once per process and clear this thread's records
    pub(crate) fn install() {
        INSTALL.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(LevelFilter::Trace);
            }
        });
        RECORDS.with(|records| records.borrow_mut().clear());
    }

    /// Drain the records logged on this thread
    pub(crate) fn take() -> Vec<(Level, String)> {
        RECORDS.with(|records| std::mem::take(&mut *records.borrow_mut()))
    }

    /// Drain this thread's records, keeping the warning messages
    pub(crate) fn take_warnings() -> Vec<String> {
        take()
            .into_iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message)
            .collect()
    }
}
