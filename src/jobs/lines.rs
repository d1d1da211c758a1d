//! Line framing for child process output.
//!
//! Pipes deliver bytes in whatever chunks the OS hands us, so a control line
//! can arrive split across reads. [`LineSplitter`] buffers until a newline
//! shows up and only then emits the line.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK: usize = 8 * 1024;

/// Reassembles arbitrarily chunked bytes into non-empty, right-trimmed lines.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: BytesMut,
    /// Prefix of `buf` already known to hold no newline.
    scanned: usize,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let raw = self.buf.split_to(self.scanned + offset);
            self.buf.advance(1);
            self.scanned = 0;
            if let Some(line) = non_empty(String::from_utf8_lossy(&raw).trim_end()) {
                lines.push(line);
            }
        }
        self.scanned = self.buf.len();
        lines
    }

    /// Flush the unterminated remainder at end of stream, trimmed on both sides.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.buf.split();
        self.scanned = 0;
        non_empty(String::from_utf8_lossy(&rest).trim())
    }
}

fn non_empty(line: &str) -> Option<String> {
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Read `reader` to EOF, calling `on_line` for every line in arrival order.
///
/// A read error ends the stream the same way EOF does.
pub async fn pump_lines<R, F>(mut reader: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut splitter = LineSplitter::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for line in splitter.push(&chunk[..n]) {
                    on_line(line);
                }
            }
            Err(e) => {
                tracing::warn!("Output stream read failed: {}", e);
                break;
            }
        }
    }

    if let Some(line) = splitter.finish() {
        on_line(line);
    }
}
