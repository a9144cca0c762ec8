//! One accepted connection.
//!
//! A `Session` owns the socket for the lifetime of the connection and
//! exposes buffered line/byte reads plus raw writes. It is generic over
//! the stream so tests can drive it with an in-memory duplex pipe.
//!
//! The `close_connection` flag is decided during request-line parsing and
//! controls whether the connection loops for another request after the
//! response has been flushed. At most one request/response pair is in
//! flight per session at any time.

use bytes::Bytes;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
                ReadHalf, WriteHalf};

/// Upper bound for a single socket read.
pub const DEFAULT_RECV_SIZE: usize = 1024 * 1024;

pub struct Session<S> {
    id: String,
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    /// Whether the connection is torn down after the current response.
    pub close_connection: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    pub fn new(stream: S) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            reader: BufReader::new(read_half),
            writer: write_half,
            close_connection: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads one line including its terminator. `None` means the peer
    /// closed the connection before sending anything further. Request
    /// lines and headers must be UTF-8; body reads go through
    /// [`read_line_raw`](Self::read_line_raw).
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.read_line_raw().await? {
            None => Ok(None),
            Some(raw) => String::from_utf8(raw)
                .map(Some)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "non-UTF-8 line")),
        }
    }

    /// Byte-oriented line read for body data, which carries no encoding
    /// guarantee.
    pub async fn read_line_raw(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut raw = Vec::new();
        let n = self.reader.read_until(b'\n', &mut raw).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(raw))
    }

    /// Reads up to `max` bytes in a single read. An empty result means
    /// end of stream.
    pub async fn read_chunk(&mut self, max: usize) -> io::Result<Bytes> {
        let mut buf = vec![0u8; max.min(DEFAULT_RECV_SIZE)];
        let n = self.reader.read(&mut buf).await?;
        buf.truncate(n);
        Ok(Bytes::from(buf))
    }

    /// Reads exactly `n` bytes or fails with `UnexpectedEof`.
    pub async fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.reader.read_exact(&mut buf).await?;
        Ok(buf)
    }

    pub async fn write_raw(&mut self, raw: &[u8]) -> io::Result<()> {
        self.writer.write_all(raw).await
    }

    pub async fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes()).await
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}
