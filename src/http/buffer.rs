//! Spillable byte buffer.
//!
//! A `SpoolBuffer` accumulates bytes in memory and migrates to a backing
//! temp file exactly once, when the written size crosses a threshold.
//! Large uploads never force whole-payload memory residency while small
//! payloads avoid filesystem overhead.
//!
//! Lifecycle is write-then-flip-then-read: all writes happen first, then
//! `flip()` switches the buffer into read mode. Writing after the flip or
//! reading before it is a caller bug and is enforced with assertions.
//! Dropping the buffer removes the spool file.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::config::DEFAULT_SPOOL_THRESHOLD;

enum Backing {
    Memory(Cursor<Vec<u8>>),
    /// Spilled, still writable through the temp file handle.
    SpoolWrite(NamedTempFile),
    /// Spilled and flipped; reads go through an independent handle so the
    /// temp file (and its path) stays alive for zero-copy consumers.
    SpoolRead { temp: NamedTempFile, reader: File },
}

pub struct SpoolBuffer {
    backing: Backing,
    threshold: usize,
    readable: bool,
    writable: bool,
}

impl SpoolBuffer {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SPOOL_THRESHOLD)
    }

    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            backing: Backing::Memory(Cursor::new(Vec::new())),
            threshold,
            readable: false,
            writable: true,
        }
    }

    /// True once the buffer has migrated to file backing.
    pub fn is_spooled(&self) -> bool {
        !matches!(self.backing, Backing::Memory(_))
    }

    /// Path of the backing file, if the buffer has spilled.
    pub fn spool_path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Memory(_) => None,
            Backing::SpoolWrite(temp) => Some(temp.path()),
            Backing::SpoolRead { temp, .. } => Some(temp.path()),
        }
    }

    /// Appends bytes. Spills to a temp file when the accumulated size
    /// crosses the threshold; the transition happens at most once.
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        assert!(self.writable, "SpoolBuffer is not writable");
        match &mut self.backing {
            Backing::Memory(cursor) => {
                cursor.write_all(data)?;
                if cursor.get_ref().len() > self.threshold {
                    let mut temp = NamedTempFile::new()?;
                    temp.write_all(cursor.get_ref())?;
                    self.backing = Backing::SpoolWrite(temp);
                }
                Ok(())
            }
            Backing::SpoolWrite(temp) => temp.write_all(data),
            Backing::SpoolRead { .. } => unreachable!("readable buffer is never writable"),
        }
    }

    /// Switches the buffer from write mode to read mode, positioned at
    /// the start. For spooled buffers this flushes the write handle and
    /// reopens the file for reading.
    pub fn flip(&mut self) -> io::Result<()> {
        assert!(self.writable, "SpoolBuffer already flipped");
        self.writable = false;
        self.readable = true;
        match std::mem::replace(&mut self.backing, Backing::Memory(Cursor::new(Vec::new()))) {
            Backing::Memory(mut cursor) => {
                cursor.set_position(0);
                self.backing = Backing::Memory(cursor);
            }
            Backing::SpoolWrite(mut temp) => {
                temp.flush()?;
                let reader = temp.reopen()?;
                self.backing = Backing::SpoolRead { temp, reader };
            }
            Backing::SpoolRead { .. } => unreachable!(),
        }
        Ok(())
    }

    /// Reads up to `buf.len()` bytes; returns the number read, 0 at end.
    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        assert!(self.readable, "SpoolBuffer is not readable");
        match &mut self.backing {
            Backing::Memory(cursor) => cursor.read(buf),
            Backing::SpoolRead { reader, .. } => reader.read(buf),
            Backing::SpoolWrite(_) => unreachable!(),
        }
    }

    /// Reads exactly `n` bytes or as many as remain before the end.
    pub fn read_at_most(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut out = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            let got = self.read(&mut out[filled..])?;
            if got == 0 {
                break;
            }
            filled += got;
        }
        out.truncate(filled);
        Ok(out)
    }

    /// Reads one line including its `\n` terminator; empty at end.
    pub fn read_line(&mut self) -> io::Result<Vec<u8>> {
        assert!(self.readable, "SpoolBuffer is not readable");
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let got = self.read(&mut byte)?;
            if got == 0 {
                break;
            }
            line.push(byte[0]);
            if byte[0] == b'\n' {
                break;
            }
        }
        Ok(line)
    }

    /// Reads everything from the current position to the end.
    pub fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        assert!(self.readable, "SpoolBuffer is not readable");
        let mut out = Vec::new();
        match &mut self.backing {
            Backing::Memory(cursor) => {
                cursor.read_to_end(&mut out)?;
            }
            Backing::SpoolRead { reader, .. } => {
                reader.read_to_end(&mut out)?;
            }
            Backing::SpoolWrite(_) => unreachable!(),
        }
        Ok(out)
    }

    /// Current position from the start of the stream.
    pub fn tell(&mut self) -> io::Result<u64> {
        match &mut self.backing {
            Backing::Memory(cursor) => Ok(cursor.position()),
            Backing::SpoolWrite(temp) => temp.as_file_mut().stream_position(),
            Backing::SpoolRead { reader, .. } => reader.stream_position(),
        }
    }

    /// Moves the position to an absolute offset from the start.
    pub fn seek(&mut self, pos: u64) -> io::Result<()> {
        match &mut self.backing {
            Backing::Memory(cursor) => {
                cursor.set_position(pos);
                Ok(())
            }
            Backing::SpoolWrite(temp) => {
                temp.as_file_mut().seek(SeekFrom::Start(pos))?;
                Ok(())
            }
            Backing::SpoolRead { reader, .. } => {
                reader.seek(SeekFrom::Start(pos))?;
                Ok(())
            }
        }
    }

    /// Total number of bytes in the buffer, independent of position.
    pub fn size(&mut self) -> io::Result<u64> {
        match &mut self.backing {
            Backing::Memory(cursor) => Ok(cursor.get_ref().len() as u64),
            Backing::SpoolWrite(temp) => Ok(temp.as_file().metadata()?.len()),
            Backing::SpoolRead { temp, .. } => Ok(temp.as_file().metadata()?.len()),
        }
    }
}

impl Default for SpoolBuffer {
    fn default() -> Self {
        Self::new()
    }
}
