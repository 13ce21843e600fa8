//! Size-based rotating log file.
//!
//! `<name>.log` is the live file; on overflow it becomes `<name>.log.1`,
//! older files shift up by one and anything past `max_files` is deleted.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

struct RollingFile {
    dir: PathBuf,
    stem: String,
    max_files: usize,
    max_size: u64,
    file: Option<File>,
    written: u64,
}

impl RollingFile {
    fn open(dir: PathBuf, app_name: &str, max_files: usize, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let mut rolling = Self {
            dir,
            stem: file_stem(app_name),
            max_files: max_files.max(1),
            max_size,
            file: None,
            written: 0,
        };
        rolling.reopen()?;
        if rolling.written > rolling.max_size {
            rolling.roll()?;
        }
        Ok(rolling)
    }

    fn live_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.stem))
    }

    fn archived_path(&self, generation: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.stem, generation))
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.live_path())?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn roll(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let oldest = self.max_files - 1;
        if oldest > 0 {
            remove_if_exists(&self.archived_path(oldest))?;
            for generation in (1..oldest).rev() {
                rename_if_exists(
                    &self.archived_path(generation),
                    &self.archived_path(generation + 1),
                )?;
            }
            rename_if_exists(&self.live_path(), &self.archived_path(1))?;
        } else {
            remove_if_exists(&self.live_path())?;
        }

        self.reopen()
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.roll()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn rename_if_exists(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn file_stem(app_name: &str) -> String {
    app_name
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => ch,
            _ => '_',
        })
        .collect()
}

/// `MakeWriter` handing out handles to one shared rolling file.
#[derive(Clone)]
pub(crate) struct SharedRollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl SharedRollingWriter {
    pub(crate) fn new(
        dir: PathBuf,
        app_name: &str,
        max_files: usize,
        max_size: u64,
    ) -> io::Result<Self> {
        let file = RollingFile::open(dir, app_name, max_files, max_size)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }
}

pub(crate) struct RollingHandle {
    inner: Arc<Mutex<RollingFile>>,
}

impl RollingHandle {
    fn with_file<T>(&self, op: impl FnOnce(&mut RollingFile) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        op(&mut file)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedRollingWriter {
    type Writer = RollingHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RollingHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for RollingHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_file_stem_sanitized() {
        assert_eq!(file_stem("stocktake"), "stocktake");
        assert_eq!(file_stem("stock take/cli"), "stock_take_cli");
    }

    #[test]
    fn test_rolls_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let writer =
            SharedRollingWriter::new(dir.path().to_path_buf(), "stocktake", 3, 10).unwrap();
        let mut handle = writer.make_writer();

        handle.write_all(b"0123456789").unwrap();
        handle.write_all(b"abcdefghij").unwrap();
        handle.write_all(b"ABCDEFGHIJ").unwrap();
        handle.write_all(b"klmnopqrst").unwrap();
        handle.flush().unwrap();

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("stocktake.log"), "klmnopqrst");
        assert_eq!(read("stocktake.log.1"), "ABCDEFGHIJ");
        assert_eq!(read("stocktake.log.2"), "abcdefghij");
        assert!(!dir.path().join("stocktake.log.3").exists());
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stocktake.log"), "before\n").unwrap();

        let writer =
            SharedRollingWriter::new(dir.path().to_path_buf(), "stocktake", 5, 1024).unwrap();
        writer.make_writer().write_all(b"after\n").unwrap();

        let contents = fs::read_to_string(dir.path().join("stocktake.log")).unwrap();
        assert_eq!(contents, "before\nafter\n");
    }
}
