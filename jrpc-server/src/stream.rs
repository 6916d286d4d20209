//! Newline-delimited JSON over byte streams
//!
//! [`LineChannel`] frames each message as one line of compact JSON on any
//! tokio reader/writer pair: pipes, sockets, or the process's own stdio via
//! [`LineChannel::stdio`]. Blank input lines are skipped. A line that is not
//! UTF-8 is consumed and reported as a parse error, like any other malformed
//! line. Outgoing lines end with the configured [`LineEnding`].
//!
//! [`WriteLineExt::write_line`] is the underlying helper and can be used on
//! any `AsyncWrite` sink directly.

use crate::channel::Channel;
use async_trait::async_trait;
use jrpc_core::{codec, Error, Result};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Line terminator written after each outgoing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    /// Native line ending of the current platform
    pub fn platform() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::platform()
    }
}

/// Write UTF-8 text followed by an optional line ending
#[async_trait]
pub trait WriteLineExt: AsyncWrite + Unpin + Send {
    async fn write_line(&mut self, text: &str, ending: Option<LineEnding>) -> std::io::Result<()> {
        self.write_all(text.as_bytes()).await?;
        if let Some(ending) = ending {
            self.write_all(ending.as_str().as_bytes()).await?;
        }
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin + Send + ?Sized> WriteLineExt for W {}

/// Channel reading and writing one JSON message per line
pub struct LineChannel<R, W> {
    reader: R,
    writer: W,
    line_ending: LineEnding,
    buffer: Vec<u8>,
    closed: bool,
}

impl<R, W> LineChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap a buffered reader and a writer
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line_ending: LineEnding::default(),
            buffer: Vec::new(),
            closed: false,
        }
    }

    /// Use `line_ending` for outgoing messages
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Split the channel back into its reader and writer
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl LineChannel<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Channel over the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> Channel for LineChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, message: Value) -> Result<()> {
        let text = codec::encode(&message)?;
        self.writer.write_line(&text, Some(self.line_ending)).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<Value>> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer).await? == 0 {
                return Ok(None);
            }
            let line = std::str::from_utf8(&self.buffer)
                .map_err(|e| Error::Parse(e.to_string()))?
                .trim();
            if line.is_empty() {
                continue;
            }
            return codec::parse(line).map(Some);
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.shutdown().await?;
        Ok(())
    }
}
