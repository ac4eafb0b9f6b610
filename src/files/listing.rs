//! Directory listing page generation.

use std::path::Path;

use log::debug;
use tokio::fs;

use crate::server::Error;
use crate::url;

/// Page template; placeholders are substituted literally.
const TEMPLATE: &str = include_str!("listing.html");

const FILE_LINE: &str = "<li><a class='file' href=\"HREF_PATH\">FILE_NAME</a></li>";
const FOLDER_LINE: &str = "<li><a href=\"HREF_PATH\">FILE_NAME</a></li>";

/// Render the listing page for a directory.
///
/// `data_dir` is the host application's data directory, offered as a
/// shortcut link at the top of the page.
pub async fn render(path: &str, data_dir: &Path) -> Result<String, Error> {
    let mut content = TEMPLATE.replace("FILE_PATH", path);
    content = content.replace("DATA_PATH", &url::encode(&data_dir.to_string_lossy()));
    content = content.replace("CONTENT", &entries_markup(path).await?);
    Ok(content)
}

/// Build the entry list: a parent link (omitted at the filesystem root),
/// then directories, then files, each group sorted by name.
async fn entries_markup(path: &str) -> Result<String, Error> {
    let mut text = String::new();

    if path.len() > 1 {
        if let Some(parent) = Path::new(path).parent() {
            let href = format!("/file?path={}", url::encode(&parent.to_string_lossy()));
            text = FOLDER_LINE
                .replace("HREF_PATH", &href)
                .replace("FILE_NAME", "..");
        }
    }

    let mut dir = match fs::read_dir(path).await {
        Ok(dir) => dir,
        // An unreadable directory still renders, just with no entries.
        Err(e) => {
            debug!("cannot list {path}: {e}");
            return Ok(text);
        }
    };

    let mut folders = Vec::new();
    let mut files = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            folders.push(name);
        } else {
            files.push(name);
        }
    }
    sort_by_name(&mut folders);
    sort_by_name(&mut files);

    let prefix = if path == "/" { "" } else { path };
    let folders = folders.iter().map(|name| (name, true));
    let files = files.iter().map(|name| (name, false));
    for (name, is_dir) in folders.chain(files) {
        let child_path = format!("{prefix}/{name}");
        let href = format!("/file?path={}", url::encode(&child_path));
        // Directory names get a leading space to offset them visually.
        let display = if is_dir {
            format!(" {name}")
        } else {
            name.clone()
        };
        let line = if is_dir { FOLDER_LINE } else { FILE_LINE };
        text.push('\n');
        text.push_str(&line.replace("HREF_PATH", &href).replace("FILE_NAME", &display));
    }

    Ok(text)
}

/// Case-insensitive ordering with the exact name as tie break, standing in
/// for locale collation.
fn sort_by_name(names: &mut [String]) {
    names.sort_by(|l, r| {
        l.to_lowercase()
            .cmp(&r.to_lowercase())
            .then_with(|| l.cmp(r))
    });
}
