/// Log backend for raw-mode terminals.
///
/// Writing to stderr while the alternate screen is active corrupts the
/// frame, so records are buffered instead. The newest one is shown on the
/// status line; the whole buffer is printed after terminal cleanup.

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Oldest records are dropped past this.
const CAPACITY: usize = 256;

pub struct StatusLog {
    records: Mutex<Vec<(Level, String)>>,
}

static STATUS_LOG: StatusLog = StatusLog { records: Mutex::new(Vec::new()) };

/// Install the buffer as the global logger.
pub fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&STATUS_LOG)?;
    log::set_max_level(level);
    Ok(())
}

/// Newest record, formatted for the status line.
pub fn latest() -> Option<String> {
    STATUS_LOG.latest()
}

/// Take every buffered record, oldest first.
pub fn drain() -> Vec<String> {
    STATUS_LOG.drain()
}

impl StatusLog {
    fn push(&self, level: Level, message: String) {
        let Ok(mut records) = self.records.lock() else { return };
        if records.len() >= CAPACITY {
            records.remove(0);
        }
        records.push((level, message));
    }

    fn latest(&self) -> Option<String> {
        let records = self.records.lock().ok()?;
        records.last().map(|(level, msg)| format!("{level}: {msg}"))
    }

    fn drain(&self) -> Vec<String> {
        match self.records.lock() {
            Ok(mut records) => records
                .drain(..)
                .map(|(level, msg)| format!("[{level}] {msg}"))
                .collect(),
            Err(_) => vec![],
        }
    }
}

impl Log for StatusLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.push(record.level(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> StatusLog {
        StatusLog { records: Mutex::new(Vec::new()) }
    }

    #[test]
    fn latest_and_drain() {
        let log = local();
        assert_eq!(log.latest(), None);
        log.push(Level::Info, "stage loaded".into());
        log.push(Level::Warn, "stage missing".into());
        assert_eq!(log.latest().as_deref(), Some("WARN: stage missing"));
        assert_eq!(log.drain(), vec!["[INFO] stage loaded", "[WARN] stage missing"]);
        assert!(log.drain().is_empty());
    }

    #[test]
    fn buffer_is_bounded() {
        let log = local();
        for i in 0..CAPACITY + 3 {
            log.push(Level::Debug, i.to_string());
        }
        let all = log.drain();
        assert_eq!(all.len(), CAPACITY);
        assert_eq!(all[0], "[DEBUG] 3");
    }
}
