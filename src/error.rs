// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when locating, fetching or parsing a feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to read feed locator {path}: {source}")]
    LocatorReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Feed locator {path} is empty")]
    EmptyLocator { path: PathBuf },

    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetching feed from {url} timed out after {}s", timeout.as_secs())]
    TimedOut { url: String, timeout: Duration },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),
}

/// Errors that can occur when listing a podcast directory
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a scan before any directory is checked
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read podcast root {path}: {source}")]
    ReadRootFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when handing episodes to the downloader
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Downloader '{name}' was not found in PATH, please install it")]
    DownloaderNotFound { name: String },

    #[error("Failed to start {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
