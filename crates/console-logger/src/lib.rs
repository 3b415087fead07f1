//! Console Logger
//!
//! `log` backend for WASM front ends.
//! Writes every record to the browser console and keeps the most recent
//! lines in a circular buffer so they can be dumped into a bug report.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Number of lines kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 200;

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Fixed-size line buffer, oldest line dropped first
#[derive(Debug)]
struct RingBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// Logger writing to `console.*` with a recent-lines buffer
pub struct ConsoleLogger {
    level: LevelFilter,
    buffer: Mutex<RingBuffer>,
}

impl ConsoleLogger {
    pub fn new(level: LevelFilter, capacity: usize) -> Self {
        Self {
            level,
            buffer: Mutex::new(RingBuffer::new(capacity)),
        }
    }

    /// Lines currently held in the buffer, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.buffer
            .lock()
            .map(|buffer| buffer.snapshot())
            .unwrap_or_default()
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record);
        write_console(record.level(), &line);
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(line);
        }
    }

    fn flush(&self) {}
}

/// Install the logger with the default buffer size
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    init_with_capacity(level, DEFAULT_CAPACITY)
}

/// Install the logger; fails if another logger is already set
pub fn init_with_capacity(level: LevelFilter, capacity: usize) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(level, capacity));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Recent lines of the installed logger (empty if not installed)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(ConsoleLogger::recent_lines).unwrap_or_default()
}

fn format_line(record: &Record) -> String {
    format!(
        "{} {:<5} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    use wasm_bindgen::JsValue;

    let value = JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, line: &str) {
    eprintln!("{}", line);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let mut buffer = RingBuffer::new(2);
        buffer.push("a".to_string());
        buffer.push("b".to_string());
        buffer.push("c".to_string());
        assert_eq!(buffer.snapshot(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut buffer = RingBuffer::new(0);
        buffer.push("a".to_string());
        assert!(buffer.snapshot().is_empty());
    }

    #[test]
    fn test_recent_lines_without_logger_is_empty() {
        assert!(recent_lines().is_empty());
    }

    #[test]
    fn test_logger_filters_by_level() {
        let logger = ConsoleLogger::new(LevelFilter::Warn, 10);
        logger.log(
            &Record::builder()
                .args(format_args!("ignored"))
                .level(Level::Info)
                .target("checklist")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("storage unavailable"))
                .level(Level::Warn)
                .target("checklist")
                .build(),
        );

        let lines = logger.recent_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("WARN"));
        assert!(lines[0].contains("[checklist]"));
        assert!(lines[0].ends_with("storage unavailable"));
    }
}
