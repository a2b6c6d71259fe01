//! Log outputs and the buffered sink
//!
//! The sink owns exactly one output handle. In buffered mode lines are held
//! in memory until either the buffer reaches its capacity or the flush
//! interval has elapsed since the last flush; both paths emit the pending
//! lines as a single write.

use super::clock::{Clock, Ticker};
use super::error::{LogError, LogResult};
use crate::config::FileSettings;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Destination for composed log chunks
pub trait LogOutput: Send {
    /// Write one chunk (one or more newline-terminated lines)
    fn write_chunk(&mut self, chunk: &str) -> io::Result<()>;

    /// Flush any OS-level buffering
    fn flush(&mut self) -> io::Result<()>;
}

/// File output
#[derive(Debug)]
pub struct FileOutput {
    /// Path of the open file
    path: PathBuf,

    /// Open handle
    file: File,
}

impl FileOutput {
    /// Open `path` for writing, truncating unless `append` is set.
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl AsRef<Path>, append: bool) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: options.open(path)?,
        })
    }

    /// Path of the open file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogOutput for FileOutput {
    fn write_chunk(&mut self, chunk: &str) -> io::Result<()> {
        self.file.write_all(chunk.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Memory output (for testing)
///
/// Clones share the same storage, so a test can keep one handle while the
/// sink owns another. Every `write_chunk` call is recorded separately.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    chunks: Arc<Mutex<Vec<String>>>,
}

impl MemoryOutput {
    /// Create a new memory output
    pub fn new() -> Self {
        Self::default()
    }

    /// Get every chunk written so far, one entry per write call
    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Get everything written so far as one string
    pub fn contents(&self) -> String {
        self.chunks.lock().map(|c| c.concat()).unwrap_or_default()
    }

    /// Get the written lines without their terminators
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Get the number of write calls
    pub fn write_count(&self) -> usize {
        self.chunks.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Clear all chunks
    pub fn clear(&self) {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.clear();
        }
    }
}

impl LogOutput for MemoryOutput {
    fn write_chunk(&mut self, chunk: &str) -> io::Result<()> {
        let mut chunks = self
            .chunks
            .lock()
            .map_err(|_| io::Error::other("memory output lock poisoned"))?;
        chunks.push(chunk.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// No output attached yet (or opening it failed)
    Uninitialized,
    /// Every line is written immediately
    Direct,
    /// Lines are held until a size or timer flush
    Buffered,
    /// Final flush done; later lines are written immediately
    ShuttingDown,
    /// Output released
    Closed,
}

impl SinkState {
    /// Get the state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Direct => "direct",
            Self::Buffered => "buffered",
            Self::ShuttingDown => "shutting_down",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a buffered flush happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTrigger {
    /// Buffer reached its capacity
    Size,
    /// Flush interval elapsed
    Timer,
    /// Final flush on shutdown
    Shutdown,
    /// Explicit flush request
    Manual,
}

impl FlushTrigger {
    /// Every trigger, in reporting order
    pub const ALL: [FlushTrigger; 4] = [Self::Size, Self::Timer, Self::Shutdown, Self::Manual];

    /// Get the trigger name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Timer => "timer",
            Self::Shutdown => "shutdown",
            Self::Manual => "manual",
        }
    }
}

/// Counters kept by the sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Lines handed to the output
    pub lines_written: u64,

    /// Bytes handed to the output, newlines included
    pub bytes_written: u64,

    /// Flushes caused by a full buffer
    pub size_flushes: u64,

    /// Flushes caused by the flush interval
    pub timer_flushes: u64,

    /// Flushes caused by shutdown
    pub shutdown_flushes: u64,

    /// Explicitly requested flushes
    pub manual_flushes: u64,

    /// Failed writes (their lines are lost)
    pub write_errors: u64,
}

impl SinkStats {
    /// Get the flush count for one trigger
    pub fn flushes(&self, trigger: FlushTrigger) -> u64 {
        match trigger {
            FlushTrigger::Size => self.size_flushes,
            FlushTrigger::Timer => self.timer_flushes,
            FlushTrigger::Shutdown => self.shutdown_flushes,
            FlushTrigger::Manual => self.manual_flushes,
        }
    }

    fn record_flush(&mut self, trigger: FlushTrigger) {
        match trigger {
            FlushTrigger::Size => self.size_flushes += 1,
            FlushTrigger::Timer => self.timer_flushes += 1,
            FlushTrigger::Shutdown => self.shutdown_flushes += 1,
            FlushTrigger::Manual => self.manual_flushes += 1,
        }
    }
}

/// Buffered, dual-trigger line sink
pub struct BufferedSink {
    /// Lifecycle state
    state: SinkState,

    /// Output handle (exclusively owned)
    output: Option<Box<dyn LogOutput>>,

    /// Pending lines, oldest first
    buffer: Vec<String>,

    /// Lines held before a size flush; 0 means direct mode
    capacity: usize,

    /// Maximum age of pending lines
    flush_interval: Duration,

    /// Uptime of the last flush (or of the last idle timer check)
    last_flush_ms: u64,

    /// Cooperative flush schedule (buffered mode only)
    ticker: Option<Ticker>,

    /// Time source
    clock: Arc<dyn Clock>,

    /// Counters
    stats: SinkStats,
}

impl BufferedSink {
    /// Create an uninitialized sink
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: SinkState::Uninitialized,
            output: None,
            buffer: Vec::new(),
            capacity: 0,
            flush_interval: Duration::from_secs(5),
            last_flush_ms: 0,
            ticker: None,
            clock,
            stats: SinkStats::default(),
        }
    }

    /// Rotate the log files and open the active file.
    ///
    /// Any previously attached output is closed first. Rotation failures are
    /// reported and do not prevent opening; an open failure leaves the sink
    /// uninitialized.
    pub fn init(&mut self, settings: &FileSettings) -> LogResult<()> {
        self.release();

        let rotation = settings.rotation();
        match rotation.rotate() {
            Ok(moved) if moved > 0 => debug!(moved, keep = rotation.keep(), "Rotated log files"),
            Ok(_) => {},
            Err(e) => warn!(error = %e, "Log rotation failed"),
        }

        let path = rotation.active_path();
        let output = FileOutput::open(&path, settings.append).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to open log file");
            LogError::Output(format!("failed to open {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), append = settings.append, "Opened log file");
        self.attach(Box::new(output), settings.buffer_size, settings.flush_interval);
        Ok(())
    }

    /// Attach an already opened output, skipping rotation.
    pub fn init_with_output(
        &mut self,
        output: Box<dyn LogOutput>,
        buffer_size: usize,
        flush_interval: Duration,
    ) {
        self.release();
        self.attach(output, buffer_size, flush_interval);
    }

    fn attach(&mut self, output: Box<dyn LogOutput>, buffer_size: usize, flush_interval: Duration) {
        let now = self.clock.uptime_ms();

        self.output = Some(output);
        self.capacity = buffer_size;
        self.flush_interval = flush_interval;
        self.last_flush_ms = now;

        if buffer_size == 0 {
            self.state = SinkState::Direct;
            self.ticker = None;
        } else {
            self.state = SinkState::Buffered;
            self.buffer.reserve(buffer_size);
            self.ticker = Some(Ticker::start(flush_interval, now));
        }
    }

    /// Write one line (without its newline).
    pub fn write(&mut self, line: &str) -> LogResult<()> {
        match self.state {
            SinkState::Uninitialized => Err(LogError::InvalidState {
                current: self.state.to_string(),
                operation: "write",
            }),
            SinkState::Closed => Err(LogError::Closed),
            SinkState::Direct | SinkState::ShuttingDown => {
                let mut chunk = String::with_capacity(line.len() + 1);
                chunk.push_str(line);
                chunk.push('\n');
                self.emit(&chunk, 1)
            },
            SinkState::Buffered => {
                self.buffer.push(line.to_string());
                if self.buffer.len() >= self.capacity {
                    self.flush_with(FlushTrigger::Size)
                } else {
                    Ok(())
                }
            },
        }
    }

    /// Flush pending lines now.
    pub fn flush(&mut self) -> LogResult<()> {
        if self.state == SinkState::Closed {
            return Err(LogError::Closed);
        }
        self.flush_with(FlushTrigger::Manual)?;
        match self.output.as_mut() {
            Some(output) => output.flush().map_err(LogError::from),
            None => Ok(()),
        }
    }

    /// Run the flush timer if it is due.
    ///
    /// Returns `true` when pending lines were flushed.
    pub fn tick(&mut self) -> LogResult<bool> {
        if self.state != SinkState::Buffered {
            return Ok(false);
        }

        let now = self.clock.uptime_ms();
        let due = match self.ticker.as_mut() {
            Some(ticker) => ticker.poll(now),
            None => false,
        };
        if !due {
            return Ok(false);
        }

        let elapsed = now.saturating_sub(self.last_flush_ms);
        if elapsed < self.flush_interval.as_millis() as u64 {
            return Ok(false);
        }

        if self.buffer.is_empty() {
            self.last_flush_ms = now;
            return Ok(false);
        }

        self.flush_with(FlushTrigger::Timer)?;
        Ok(true)
    }

    /// Flush once, stop the timer and switch to direct writes.
    ///
    /// Calling it again does nothing.
    pub fn shutdown(&mut self) -> LogResult<()> {
        match self.state {
            SinkState::Uninitialized | SinkState::ShuttingDown | SinkState::Closed => {
                return Ok(());
            },
            SinkState::Direct | SinkState::Buffered => {},
        }

        if let Some(ticker) = self.ticker.as_mut() {
            ticker.cancel();
        }
        self.state = SinkState::ShuttingDown;

        let flushed = self.flush_with(FlushTrigger::Shutdown);
        if let Some(output) = self.output.as_mut() {
            output.flush()?;
        }
        flushed
    }

    /// Shut down and release the output.
    pub fn close(&mut self) -> LogResult<()> {
        if self.state == SinkState::Closed {
            return Ok(());
        }
        let result = self.shutdown();
        self.output = None;
        self.ticker = None;
        self.state = SinkState::Closed;
        result
    }

    /// Close the current output (flushing what is pending) and reset.
    fn release(&mut self) {
        if self.output.is_some() {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to close previous log output");
            }
        }
        self.buffer.clear();
        self.ticker = None;
        self.state = SinkState::Uninitialized;
    }

    fn flush_with(&mut self, trigger: FlushTrigger) -> LogResult<()> {
        self.last_flush_ms = self.clock.uptime_ms();
        if self.buffer.is_empty() {
            return Ok(());
        }

        let lines = std::mem::take(&mut self.buffer);
        let size = lines.iter().map(|l| l.len() + 1).sum();
        let mut chunk = String::with_capacity(size);
        for line in &lines {
            chunk.push_str(line);
            chunk.push('\n');
        }

        self.buffer = Vec::with_capacity(self.capacity);
        self.stats.record_flush(trigger);
        debug!(trigger = trigger.as_str(), lines = lines.len(), "Flushing log buffer");
        self.emit(&chunk, lines.len() as u64)
    }

    fn emit(&mut self, chunk: &str, lines: u64) -> LogResult<()> {
        let Some(output) = self.output.as_mut() else {
            return Err(LogError::Closed);
        };

        match output.write_chunk(chunk) {
            Ok(()) => {
                self.stats.lines_written += lines;
                self.stats.bytes_written += chunk.len() as u64;
                Ok(())
            },
            Err(e) => {
                self.stats.write_errors += 1;
                warn!(error = %e, lines, "Failed to write log lines");
                Err(LogError::Io(e))
            },
        }
    }

    /// Current state
    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Number of pending lines
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer capacity (0 in direct mode)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Flush interval
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Counters
    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }
}

impl fmt::Debug for BufferedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedSink")
            .field("state", &self.state)
            .field("pending", &self.buffer.len())
            .field("capacity", &self.capacity)
            .field("flush_interval", &self.flush_interval)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Drop for BufferedSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close log sink");
        }
    }
}
