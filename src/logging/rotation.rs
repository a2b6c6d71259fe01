//! Index-shifting log rotation
//!
//! With `keep = K` there are K generations: the active file `<base><ext>`
//! and `<base>.0<ext>` .. `<base>.(K-2)<ext>`. Rotating turns the active file
//! into `<base>.0<ext>`, moves `<base>.i<ext>` to `<base>.(i+1)<ext>` and
//! discards the oldest generation. Rotation only runs while the sink's
//! handle is closed.

use super::error::{LogError, LogResult};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Highest accepted keep count.
pub const MAX_KEEP: u32 = 100;

/// Log file naming and rotation policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Path of the active file without extension
    base_path: PathBuf,

    /// File extension including the leading dot
    extension: String,

    /// Number of generations kept (values of 1 or less disable rotation)
    keep: u32,
}

impl RotationPolicy {
    /// Create a policy; `keep` is clamped to `[0, MAX_KEEP]`
    pub fn new(base_path: impl Into<PathBuf>, extension: impl Into<String>, keep: u32) -> Self {
        Self {
            base_path: base_path.into(),
            extension: extension.into(),
            keep: keep.min(MAX_KEEP),
        }
    }

    /// Number of generations kept
    pub fn keep(&self) -> u32 {
        self.keep
    }

    /// Check whether rotation does anything
    pub fn is_enabled(&self) -> bool {
        self.keep > 1
    }

    /// Path of the active log file
    pub fn active_path(&self) -> PathBuf {
        let mut name = OsString::from(self.base_path.as_os_str());
        name.push(&self.extension);
        PathBuf::from(name)
    }

    /// Path of the rotated file at `index`
    pub fn indexed_path(&self, index: u32) -> PathBuf {
        let mut name = OsString::from(self.base_path.as_os_str());
        name.push(format!(".{}{}", index, self.extension));
        PathBuf::from(name)
    }

    /// Path of generation `slot`: slot 0 is the active file, slot `n` is
    /// the rotated file at index `n - 1`
    fn slot_path(&self, slot: u32) -> PathBuf {
        match slot {
            0 => self.active_path(),
            n => self.indexed_path(n - 1),
        }
    }

    /// Shift every generation up by one index.
    ///
    /// Returns the number of files moved.
    pub fn rotate(&self) -> LogResult<usize> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let oldest = self.slot_path(self.keep - 1);
        if oldest.exists() {
            fs::remove_file(&oldest).map_err(|e| rotation_error("remove", &oldest, e))?;
            debug!(path = %oldest.display(), "Discarded oldest log generation");
        }

        let mut moved = 0;
        for slot in (0..self.keep - 1).rev() {
            let source = self.slot_path(slot);
            if source.exists() {
                shift(&source, &self.slot_path(slot + 1))?;
                moved += 1;
            }
        }

        Ok(moved)
    }
}

fn shift(source: &Path, target: &Path) -> LogResult<()> {
    fs::copy(source, target).map_err(|e| rotation_error("copy", source, e))?;
    fs::remove_file(source).map_err(|e| rotation_error("remove", source, e))?;
    Ok(())
}

fn rotation_error(action: &str, path: &Path, err: std::io::Error) -> LogError {
    LogError::Rotation(format!("failed to {} {}: {}", action, path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_paths() {
        let policy = RotationPolicy::new("/var/log/eventlog_1", ".ndjson", 5);
        assert_eq!(
            policy.active_path(),
            PathBuf::from("/var/log/eventlog_1.ndjson")
        );
        assert_eq!(
            policy.indexed_path(3),
            PathBuf::from("/var/log/eventlog_1.3.ndjson")
        );
    }

    #[test]
    fn test_keep_is_clamped() {
        let policy = RotationPolicy::new("log", ".ndjson", 1000);
        assert_eq!(policy.keep(), MAX_KEEP);
    }

    #[test]
    fn test_keep_one_or_less_is_noop() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app");

        for keep in [0, 1] {
            let policy = RotationPolicy::new(&base, ".ndjson", keep);
            write(&policy.active_path(), "active\n");
            assert_eq!(policy.rotate().unwrap(), 0);
            assert_eq!(read(&policy.active_path()), "active\n");
            assert!(!policy.indexed_path(0).exists());
        }
    }

    #[test]
    fn test_keep_two_single_shift() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new(dir.path().join("app"), ".ndjson", 2);

        write(&policy.active_path(), "current\n");
        write(&policy.indexed_path(0), "previous\n");

        assert_eq!(policy.rotate().unwrap(), 1);
        assert!(!policy.active_path().exists());
        assert_eq!(read(&policy.indexed_path(0)), "current\n");
        assert!(!policy.indexed_path(1).exists());
    }

    #[test]
    fn test_keep_three_shifts_generations() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new(dir.path().join("app"), ".ndjson", 3);

        write(&policy.active_path(), "gen-active\n");
        write(&policy.indexed_path(0), "gen-0\n");
        write(&policy.indexed_path(1), "gen-1\n");

        assert_eq!(policy.rotate().unwrap(), 2);
        assert!(!policy.active_path().exists());
        assert_eq!(read(&policy.indexed_path(0)), "gen-active\n");
        assert_eq!(read(&policy.indexed_path(1)), "gen-0\n");
        assert!(!policy.indexed_path(2).exists());
    }

    #[test]
    fn test_missing_generations_are_skipped() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new(dir.path().join("app"), ".ndjson", 4);

        write(&policy.active_path(), "a\n");
        write(&policy.indexed_path(1), "one\n");

        assert_eq!(policy.rotate().unwrap(), 2);
        assert_eq!(read(&policy.indexed_path(0)), "a\n");
        assert!(!policy.indexed_path(1).exists());
        assert_eq!(read(&policy.indexed_path(2)), "one\n");
    }

    #[test]
    fn test_large_keep_repeated_rotation() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new(dir.path().join("app"), ".ndjson", 50);

        for run in 0..60 {
            write(&policy.active_path(), &format!("run-{run}\n"));
            policy.rotate().unwrap();
        }

        // 49 generations survive: indices 0..=48
        assert_eq!(read(&policy.indexed_path(0)), "run-59\n");
        assert_eq!(read(&policy.indexed_path(48)), "run-11\n");
        assert!(!policy.indexed_path(49).exists());
    }

    #[test]
    fn test_rotate_with_nothing_present() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new(dir.path().join("app"), ".ndjson", 5);
        assert_eq!(policy.rotate().unwrap(), 0);
    }
}
