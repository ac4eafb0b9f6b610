//! HTTP response types and serialization.

use std::collections::BTreeMap;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::server::status::HttpStatus;

/// Chunk size used when copying a streamed body to the connection.
const BODY_CHUNK_SIZE: usize = 16 * 1024;

/// A response body.
///
/// `Stream` holds a lazily read byte source, typically a file opened by a
/// handler but not read until serialization; it is drained and dropped
/// exactly once in [`HttpResponse::write_to`].
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    Stream(Box<dyn AsyncRead + Send + Unpin>),
}

/// An HTTP response under construction by a handler.
pub struct HttpResponse {
    /// The status; stays `NotFound` unless a handler claims the request.
    pub status: HttpStatus,
    /// Response headers, emitted with the names exactly as supplied. A
    /// sorted map keeps repeated responses byte-identical.
    pub headers: BTreeMap<String, String>,
    /// The response body, consumed once during serialization.
    pub body: Body,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: HttpStatus::NotFound,
            headers: BTreeMap::new(),
            body: Body::Empty,
        }
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Buffer a UTF-8 text body and set `Content-Length` to its byte size.
    pub fn set_text_body(&mut self, text: impl Into<String>) {
        let bytes = text.into().into_bytes();
        self.set_header("Content-Length", bytes.len().to_string());
        self.body = Body::Bytes(bytes);
    }

    /// Serialize the response to the connection, consuming the body.
    ///
    /// Writes the status line, the headers, a forced `Connection: close`, a
    /// blank line, then the body in 16 KiB chunks. Flushes after the headers
    /// and again after the body so everything is delivered before the socket
    /// closes.
    pub async fn write_to<W>(self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let status = self.status;
        let status_line = format!("HTTP/1.1 {} {}\r\n", status.code(), status.description());
        writer.write_all(status_line.as_bytes()).await?;

        for (name, value) in &self.headers {
            writer.write_all(format!("{name}: {value}\r\n").as_bytes()).await?;
        }
        writer.write_all(b"Connection: close\r\n\r\n").await?;
        writer.flush().await?;

        match self.body {
            Body::Empty => {}
            Body::Bytes(bytes) => writer.write_all(&bytes).await?,
            Body::Stream(mut source) => {
                let mut buf = vec![0u8; BODY_CHUNK_SIZE];
                loop {
                    let read = source.read(&mut buf).await?;
                    if read == 0 {
                        break;
                    }
                    writer.write_all(&buf[..read]).await?;
                }
            }
        }

        writer.flush().await
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}
