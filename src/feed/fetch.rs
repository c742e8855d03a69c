// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use bytes::Bytes;

use crate::error::FeedError;
use crate::http::HttpClient;

use super::parse::parse_episode_urls;

/// Read the feed locator of a podcast directory (trimmed)
pub async fn read_feed_locator(dir: &Path, locator_name: &str) -> Result<String, FeedError> {
    let path = dir.join(locator_name);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| FeedError::LocatorReadFailed {
            path: path.clone(),
            source: e,
        })?;

    let locator = content.trim();
    if locator.is_empty() {
        return Err(FeedError::EmptyLocator { path });
    }
    Ok(locator.to_string())
}

/// Fetch raw feed bytes from a URL (without parsing)
pub async fn fetch_feed_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Bytes, FeedError> {
    let bytes = client
        .get_bytes(url)
        .await
        .map_err(|e| FeedError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;
    Ok(bytes)
}

/// Read raw feed bytes from a local file (without parsing)
pub async fn read_feed_file(path: &Path) -> Result<Vec<u8>, FeedError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| FeedError::FileReadFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Fetch the episode URLs of a podcast directory, newest first.
///
/// The locator names either a feed URL or a local feed file. Relative
/// file paths are resolved against `dir`.
pub async fn fetch_episode_urls<C: HttpClient + ?Sized>(
    client: &C,
    dir: &Path,
    locator_name: &str,
) -> Result<Vec<String>, FeedError> {
    let locator = read_feed_locator(dir, locator_name).await?;

    let bytes = if is_url(&locator) {
        fetch_feed_bytes(client, &locator).await?.to_vec()
    } else {
        read_feed_file(&dir.join(&locator)).await?
    };

    parse_episode_urls(&bytes)
}

/// Determine if a string is a URL or a file path
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
