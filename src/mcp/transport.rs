//! stdio transport for the MCP server.
//!
//! - Messages are UTF-8 JSON, one per line, with no embedded newlines
//! - stdin carries client messages, stdout carries server messages
//! - stderr is free for logging

use std::io;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Line-delimited JSON transport over an async reader/writer pair.
///
/// [`StdioTransport`] is the production instantiation; tests can run the
/// same code over in-memory buffers.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// The transport used by the server binary.
pub type StdioTransport = LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a transport over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over the given reader and writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next line, without its line terminator.
    ///
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    /// Serialises `message` as one line of JSON and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_message<T: Serialize>(&mut self, message: &T) -> io::Result<()> {
        // serde_json's compact form never contains a raw newline.
        let mut json = serde_json::to_vec(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        json.push(b'\n');

        self.writer.write_all(&json).await?;
        self.writer.flush().await
    }

    /// Consumes the transport, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}
