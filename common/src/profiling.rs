//! Session log ring with levels and timestamps.
//!
//! Errors never propagate out of the watch face session; they land here
//! instead. The ring keeps the last [`LOG_ENTRIES`] entries, oldest dropped
//! first. With the `defmt` feature every entry is mirrored to the defmt
//! transport as well, so RTT shows the same lines the simulator prints.
//!
//! # Usage
//!
//! ```ignore
//! use watchface_common::{log_info, log_warn};
//!
//! log_info!(self.log, now_ms, "visible, ambient={}", ambient);
//! log_warn!(self.log, now_ms, "asset rebuild failed: {}", err);
//! ```

use core::fmt::{self, Write};

use heapless::String;

/// Maximum number of log entries to keep.
pub const LOG_ENTRIES: usize = 16;

/// Maximum characters per log message.
pub const LOG_MSG_LEN: usize = 48;

/// Log severity level.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    /// Verbose tracing (every tick)
    Trace = 0,
    /// State transitions
    Debug = 1,
    /// Normal operation
    #[default]
    Info = 2,
    /// Recoverable failures (asset fallback, skipped data)
    Warn = 3,
    /// Failed frames
    Error = 4,
}

impl LogLevel {
    /// Single-character prefix for compact output.
    pub const fn prefix(self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// A single log entry with level, message, and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Message, truncated to [`LOG_MSG_LEN`].
    pub message: String<LOG_MSG_LEN>,
    /// Wall-clock milliseconds, truncated to 32 bits.
    pub timestamp_ms: u32,
}

impl LogEntry {
    pub fn new(
        level: LogLevel,
        message: &str,
        timestamp_ms: u32,
    ) -> Self {
        let mut msg: String<LOG_MSG_LEN> = String::new();
        for c in message.chars() {
            if msg.push(c).is_err() {
                break;
            }
        }
        Self {
            level,
            message: msg,
            timestamp_ms,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{}] {:>10} {}", self.level.prefix(), self.timestamp_ms, self.message)
    }
}

/// Writer that silently truncates at capacity instead of failing the format.
struct Truncating<'a>(&'a mut String<LOG_MSG_LEN>);

impl Write for Truncating<'_> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Circular buffer of log entries.
#[derive(Debug)]
pub struct LogBuffer {
    entries: [LogEntry; LOG_ENTRIES],
    head: usize, // Next write position
    count: usize,
    min_level: LogLevel,
}

impl LogBuffer {
    /// Create an empty buffer that keeps `Debug` and above.
    pub const fn new() -> Self {
        Self {
            entries: [const {
                LogEntry {
                    level: LogLevel::Info,
                    message: String::new(),
                    timestamp_ms: 0,
                }
            }; LOG_ENTRIES],
            head: 0,
            count: 0,
            min_level: LogLevel::Debug,
        }
    }

    /// Drop entries below `level`.
    pub fn set_min_level(
        &mut self,
        level: LogLevel,
    ) {
        self.min_level = level;
    }

    /// Push a new log entry. Oldest entry is dropped if buffer is full.
    pub fn push(
        &mut self,
        entry: LogEntry,
    ) {
        if entry.level < self.min_level {
            return;
        }
        self.entries[self.head] = entry;
        self.head = (self.head + 1) % LOG_ENTRIES;
        if self.count < LOG_ENTRIES {
            self.count += 1;
        }
    }

    /// Format and push, mirroring to defmt when enabled.
    pub fn push_log(
        &mut self,
        level: LogLevel,
        timestamp_ms: u64,
        args: fmt::Arguments<'_>,
    ) {
        if level < self.min_level {
            return;
        }
        let mut message: String<LOG_MSG_LEN> = String::new();
        let _ = Truncating(&mut message).write_fmt(args);

        #[cfg(feature = "defmt")]
        match level {
            LogLevel::Trace => defmt::trace!("{=str}", message.as_str()),
            LogLevel::Debug => defmt::debug!("{=str}", message.as_str()),
            LogLevel::Info => defmt::info!("{=str}", message.as_str()),
            LogLevel::Warn => defmt::warn!("{=str}", message.as_str()),
            LogLevel::Error => defmt::error!("{=str}", message.as_str()),
        }

        self.push(LogEntry {
            level,
            message,
            timestamp_ms: timestamp_ms as u32,
        });
    }

    #[inline]
    pub const fn len(&self) -> usize { self.count }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.count == 0 }

    /// Most recent entry, if any.
    pub fn last(&self) -> Option<&LogEntry> {
        if self.count == 0 {
            return None;
        }
        Some(&self.entries[(self.head + LOG_ENTRIES - 1) % LOG_ENTRIES])
    }

    /// Iterate over entries from oldest to newest.
    pub fn iter(&self) -> LogBufferIter<'_> {
        let start = if self.count < LOG_ENTRIES { 0 } else { self.head };
        LogBufferIter {
            buffer: self,
            pos: start,
            remaining: self.count,
        }
    }
}

impl Default for LogBuffer {
    fn default() -> Self { Self::new() }
}

/// Iterator over log buffer entries (oldest to newest).
pub struct LogBufferIter<'a> {
    buffer: &'a LogBuffer,
    pos: usize,
    remaining: usize,
}

impl<'a> Iterator for LogBufferIter<'a> {
    type Item = &'a LogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = &self.buffer.entries[self.pos];
        self.pos = (self.pos + 1) % LOG_ENTRIES;
        self.remaining -= 1;
        Some(entry)
    }
}

// =============================================================================
// Macros
// =============================================================================

/// Log at Trace level into a [`LogBuffer`].
#[macro_export]
macro_rules! log_trace {
    ($log:expr, $now:expr, $($arg:tt)*) => {
        $log.push_log($crate::profiling::LogLevel::Trace, $now, format_args!($($arg)*))
    };
}

/// Log at Debug level into a [`LogBuffer`].
#[macro_export]
macro_rules! log_debug {
    ($log:expr, $now:expr, $($arg:tt)*) => {
        $log.push_log($crate::profiling::LogLevel::Debug, $now, format_args!($($arg)*))
    };
}

/// Log at Info level into a [`LogBuffer`].
#[macro_export]
macro_rules! log_info {
    ($log:expr, $now:expr, $($arg:tt)*) => {
        $log.push_log($crate::profiling::LogLevel::Info, $now, format_args!($($arg)*))
    };
}

/// Log at Warn level into a [`LogBuffer`].
#[macro_export]
macro_rules! log_warn {
    ($log:expr, $now:expr, $($arg:tt)*) => {
        $log.push_log($crate::profiling::LogLevel::Warn, $now, format_args!($($arg)*))
    };
}

/// Log at Error level into a [`LogBuffer`].
#[macro_export]
macro_rules! log_error {
    ($log:expr, $now:expr, $($arg:tt)*) => {
        $log.push_log($crate::profiling::LogLevel::Error, $now, format_args!($($arg)*))
    };
}

// =============================================================================
// Tests
// =============================================================================
