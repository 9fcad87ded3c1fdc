//! The file sink backing a [`super::Logger`]'s optional file output,
//! including time-stamped rotation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

/// Size/count bounds for the rotating file sink.
#[derive(Clone, Copy, Debug)]
pub struct RotationOptions {
    pub max_size_bytes: u64,
    pub max_files: usize,
}

/// A single append-only (optionally rotating) log file.
pub struct FileSink {
    path: PathBuf,
    file: File,
    size: u64,
    rotation: Option<RotationOptions>,
}
impl FileSink {
    pub fn open(path: PathBuf, rotation: Option<RotationOptions>) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self { path, file, size, rotation })
    }

    /// Appends `line` (expected to already end in `\n`), rotating first if
    /// the write would exceed `max_size_bytes`.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        if let Some(rotation) = self.rotation {
            if self.size + line.len() as u64 > rotation.max_size_bytes && self.size > 0 {
                self.rotate(rotation)?;
            }
        }
        self.file.write_all(line.as_bytes())?;
        self.size += line.len() as u64;
        Ok(())
    }

    fn rotate(&mut self, rotation: RotationOptions) -> io::Result<()> {
        let stamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
        let rotated = rotated_name(&self.path, &stamp.to_string());
        fs::rename(&self.path, &rotated)?;

        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.size = 0;

        prune_rotated(&self.path, rotation.max_files)?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> { self.file.flush() }
}

fn rotated_name(path: &Path, stamp: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("transfer");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("log");
    path.with_file_name(format!("{stem}.{stamp}.{ext}"))
}

fn prune_rotated(active_path: &Path, max_files: usize) -> io::Result<()> {
    let dir = match active_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return Ok(()),
    };
    let stem = active_path.file_stem().and_then(|s| s.to_str()).unwrap_or("transfer").to_string();
    let ext = active_path.extension().and_then(|s| s.to_str()).unwrap_or("log").to_string();
    let prefix = format!("{stem}.");
    let suffix = format!(".{ext}");

    let mut rotated: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name().and_then(|n| n.to_str()).map(|n| n.starts_with(&prefix) && n.ends_with(&suffix) && n != active_path.file_name().unwrap_or_default()).unwrap_or(false)
        })
        .collect();
    rotated.sort();

    while rotated.len() > max_files.saturating_sub(1) {
        let oldest = rotated.remove(0);
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}
