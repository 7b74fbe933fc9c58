use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};
use url::Url;

use crate::core::http;
use crate::models::MovieRecord;
use crate::utils::{Error, Result};

static INVALID_PATH_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    /// Also write the JSON record to this path.
    pub output_path: Option<PathBuf>,
    /// Download preview images into `<dvd_id>/preview/`.
    pub download: bool,
}

/// Print the record as JSON, then honor the optional file/download outputs.
pub async fn emit(
    client: &reqwest::Client,
    record: &MovieRecord,
    options: &EmitOptions,
) -> Result<()> {
    let pretty = serde_json::to_string_pretty(record)?;
    println!("{pretty}");

    if let Some(path) = &options.output_path {
        tokio::fs::write(path, &pretty).await?;
        info!(target: "javmeta::output", path = %path.display(), "Wrote metadata");
    }

    if options.download {
        download_previews(client, record, &pretty).await?;
    }

    Ok(())
}

/// Fetch every preview image one at a time, best effort: a failed image is
/// logged and skipped, and the metadata JSON is written either way.
async fn download_previews(
    client: &reqwest::Client,
    record: &MovieRecord,
    pretty: &str,
) -> Result<()> {
    let folder = PathBuf::from(safe_filename(&record.dvd_id));
    let preview_dir = folder.join("preview");
    // pre-existing directories are fine
    tokio::fs::create_dir_all(&preview_dir).await?;

    info!(
        target: "javmeta::output",
        count = record.preview_images.len(),
        dir = %preview_dir.display(),
        "Downloading preview images"
    );

    for (i, url) in record.preview_images.iter().enumerate() {
        let name = preview_file_name(&record.content_id, i, url);
        let dest = preview_dir.join(&name);
        match download_image(client, url, &dest).await {
            Ok(()) => info!(target: "javmeta::output", file = %name, "Downloaded"),
            Err(e) => warn!(target: "javmeta::output", "{e}"),
        }
    }

    let json_path = folder.join(format!("{}.json", record.content_id));
    tokio::fs::write(&json_path, pretty).await?;
    info!(target: "javmeta::output", path = %json_path.display(), "Stored metadata");

    Ok(())
}

async fn download_image(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let bytes = http::fetch_bytes(client, url)
        .await
        .map_err(|e| Error::DownloadError {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    tokio::fs::write(dest, bytes)
        .await
        .map_err(|e| Error::DownloadError {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}

/// `<content_id>-<i>.<ext>`, 1-based, matching on-page order.
fn preview_file_name(content_id: &str, index: usize, url: &str) -> String {
    format!("{}-{}.{}", content_id, index + 1, extension_from_url(url))
}

fn extension_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path()
                .rsplit('/')
                .next()
                .and_then(|file| file.rsplit_once('.'))
                .map(|(_, ext)| ext.to_string())
        })
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string())
}

/// Filesystem-safe directory name: invalid characters become dashes,
/// whitespace runs become underscores, capped at 200 chars.
pub fn safe_filename(name: &str) -> String {
    let name = name.trim();
    let name = INVALID_PATH_CHARS_RE.replace_all(name, "-");
    let name = WHITESPACE_RE.replace_all(&name, "_");
    name.chars().take(200).collect()
}
