//! HTTP request reading and representation.

use std::collections::HashMap;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::parser::error::Error;
use crate::url;

/// A single parsed HTTP request.
///
/// Built once per connection by [`read_request`]; handlers only read it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The request method token, e.g. "GET".
    pub method: String,
    /// The request path, query string stripped and percent-decoded.
    pub path: String,
    /// The protocol token from the request line, e.g. "HTTP/1.1".
    pub protocol: String,
    /// Query parameters, percent-decoded. Keys are case-sensitive.
    pub query: HashMap<String, String>,
    /// Request headers. Keys are lower-cased; repeated names keep the last
    /// value seen.
    pub headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Look up a header by name, case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_ascii_lowercase())
    }

    /// Look up a query parameter by exact name.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query.get(name)
    }
}

/// Read exactly one request from the stream.
///
/// Returns `Ok(None)` when the peer closed the connection before sending
/// anything; that is a normal disconnect, not an error. Header lines are read
/// until an empty line or end of stream. No request body is consumed.
pub async fn read_request<R>(reader: &mut R) -> Result<Option<HttpRequest>, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let (method, target, protocol) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(target), Some(protocol)) => {
            (method.to_string(), target.to_string(), protocol.to_string())
        }
        _ => return Err(Error::MalformedRequestLine(line.trim_end().to_string())),
    };

    let (path, query) = split_target(&target);

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            break;
        }
        // Split on the first colon only; lines without one are skipped.
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    Ok(Some(HttpRequest {
        method,
        path,
        protocol,
        query,
        headers,
    }))
}

/// Split a request-target into a decoded path and decoded query parameters.
fn split_target(target: &str) -> (String, HashMap<String, String>) {
    let (path, raw_query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let mut query = HashMap::new();
    if let Some(raw) = raw_query {
        for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
            match pair.split_once('=') {
                Some((key, value)) => {
                    query.insert(url::decode(key).trim().to_string(), url::decode(value));
                }
                // A token with no '=' is a value-less key.
                None => {
                    query.insert(url::decode(pair).trim().to_string(), String::new());
                }
            }
        }
    }

    (url::decode(path), query)
}
