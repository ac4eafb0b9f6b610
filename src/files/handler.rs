//! The `/file` request handler: directory listings and file downloads.

use std::path::{Path, PathBuf};

use log::debug;
use tokio::fs::File;

use crate::files::listing;
use crate::parser::HttpRequest;
use crate::server::{
    Body, Error, HandlerFuture, HttpResponse, HttpStatus, Outcome, RequestHandler,
};

/// Serves a browsable view of the host filesystem.
///
/// The `path` query parameter (default `/`) is resolved as-is against the
/// filesystem root: there is no containment check, so any path readable by
/// the process is reachable. That matches this server's role as a trusted
/// local debugging aid; do not expose it on an untrusted network.
pub struct FileHandler {
    /// Host application data directory, offered as a shortcut on the page.
    data_dir: PathBuf,
}

impl FileHandler {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    async fn serve(
        &self,
        request: &HttpRequest,
        response: &mut HttpResponse,
    ) -> Result<Outcome, Error> {
        let path = match request.query.get("path") {
            Some(path) if !path.is_empty() => path.as_str(),
            _ => "/",
        };

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("cannot stat {path}: {e}");
                return Ok(Outcome::Declined);
            }
        };

        if metadata.is_dir() {
            let content = listing::render(path, &self.data_dir).await?;
            response.set_header("Content-Type", "text/html");
            response.set_text_body(content);
        } else {
            let file = match File::open(path).await {
                Ok(file) => file,
                Err(e) => {
                    debug!("cannot open {path}: {e}");
                    return Ok(Outcome::Declined);
                }
            };
            response.set_header("Content-Length", metadata.len().to_string());
            let content_type = content_type(path, response);
            response.set_header("Content-Type", content_type);
            // The file is opened here but read only during serialization.
            response.body = Body::Stream(Box::new(file));
        }

        response.status = HttpStatus::Ok;
        Ok(Outcome::Served)
    }
}

/// Resolve the Content-Type from the file name. Unknown or wildcard types
/// are forced to `application/octet-stream` with an attachment disposition
/// so browsers download instead of rendering inline.
fn content_type(path: &str, response: &mut HttpResponse) -> String {
    match mime_guess::from_path(path).first() {
        Some(mime) if mime.essence_str() != "*/*" => mime.essence_str().to_string(),
        _ => {
            let name = Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            response.set_header("Content-Disposition", format!("attachment; filename=\"{name}\""));
            "application/octet-stream".to_string()
        }
    }
}

impl RequestHandler for FileHandler {
    fn handle<'a>(
        &'a self,
        request: &'a HttpRequest,
        response: &'a mut HttpResponse,
    ) -> HandlerFuture<'a> {
        Box::pin(self.serve(request, response))
    }
}
