// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::{Encode, FixedSize},
    offset::FileOffset,
};
use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

/// Random-access byte store over a single file
///
/// Every read and write covers a whole record. Reads past the end of the
/// file fail with [`std::io::ErrorKind::UnexpectedEof`]. There is no caching
/// or write buffering beyond what the OS does.
#[derive(Debug)]
pub struct FileStore {
    file: File,
    path: PathBuf,
}

impl FileStore {
    /// Opens (or creates) the file at `path` for reading and writing.
    ///
    /// If `truncate` is set, existing contents are discarded.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn open<P: AsRef<Path>>(path: P, truncate: bool) -> std::io::Result<Self> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(truncate)
            .open(path)?;

        Ok(Self {
            file,
            path: path.into(),
        })
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file length in bytes.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn len(&self) -> std::io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Returns `true` if the file is empty.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn is_empty(&self) -> std::io::Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Position a new zone record is appended at.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn append_offset(&self, zone_start: FileOffset) -> std::io::Result<FileOffset> {
        let len = self.len()?;

        Ok(FileOffset::new(len).map_or(zone_start, |end| end.max(zone_start)))
    }

    /// Resizes the file to `len` bytes, zero-filling any extension.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn set_len(&self, len: u64) -> std::io::Result<()> {
        self.file.set_len(len)
    }

    /// Fills `buf` with the bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs, or the file ends early.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        read_exact_at(&self.file, buf, offset)
    }

    /// Writes all of `bytes` at `offset`, extending the file if needed.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn write_at(&self, offset: u64, bytes: &[u8]) -> std::io::Result<()> {
        write_all_at(&self.file, bytes, offset)
    }

    /// Reads and decodes the record at `offset`.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs, or the bytes do not decode.
    pub fn read_record<T: FixedSize>(&self, offset: FileOffset) -> crate::Result<T> {
        self.read_record_at(offset.get())
    }

    pub(crate) fn read_record_at<T: FixedSize>(&self, offset: u64) -> crate::Result<T> {
        let mut buf = vec![0; T::SERIALIZED_LEN];
        self.read_at(offset, &mut buf)?;
        Ok(T::decode_from(&mut &buf[..])?)
    }

    /// Encodes and writes the record at `offset`.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn write_record<T: FixedSize>(&self, offset: FileOffset, record: &T) -> crate::Result<()> {
        self.write_record_at(offset.get(), record)
    }

    pub(crate) fn write_record_at<T: Encode>(&self, offset: u64, record: &T) -> crate::Result<()> {
        let bytes = record.encode_into_vec();
        self.write_at(offset, &bytes)?;
        Ok(())
    }

    /// Flushes file contents and metadata to disk.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn sync(&self) -> std::io::Result<()> {
        self.file.sync_all()
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;

    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, bytes: &[u8], offset: u64) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;

    file.write_all_at(bytes, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;

    let mut done = 0;

    while let Some(rest) = buf.get_mut(done..).filter(|rest| !rest.is_empty()) {
        let bytes_read = file.seek_read(rest, offset + done as u64)?;

        if bytes_read == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "failed to fill whole buffer",
            ));
        }

        done += bytes_read;
    }

    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, bytes: &[u8], offset: u64) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;

    let mut done = 0;

    while let Some(rest) = bytes.get(done..).filter(|rest| !rest.is_empty()) {
        let bytes_written = file.seek_write(rest, offset + done as u64)?;

        if bytes_written == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "failed to write whole buffer",
            ));
        }

        done += bytes_written;
    }

    Ok(())
}
