// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

/// Number of trailing local entries inspected by the fast path
pub const DEFAULT_LOOK_AHEAD: usize = 5;

/// Number of directories checked concurrently
pub const DEFAULT_WORKERS: usize = 4;

/// Suffix marking an in-progress transfer next to the final file name
pub const DEFAULT_TRANSFER_SUFFIX: &str = ".torrent";

/// File inside each podcast directory naming its feed
pub const DEFAULT_FEED_LOCATOR: &str = "feed.url";

/// Executable used to download episodes
pub const DEFAULT_DOWNLOADER: &str = "aria2c";

/// Upper bound for fetching a single feed
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Tracing filter used when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Rules for deciding which remote episodes are new
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// How many of the last local entries the fast path looks at (0 disables it)
    pub look_ahead: usize,
    /// Suffix of in-progress transfer artifacts
    pub transfer_suffix: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            look_ahead: DEFAULT_LOOK_AHEAD,
            transfer_suffix: DEFAULT_TRANSFER_SUFFIX.to_string(),
        }
    }
}

/// Options for checking podcast directories
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Name of the feed locator file inside each directory
    pub feed_locator: String,
    /// Size of the worker pool
    pub workers: usize,
    /// Timeout for a single feed fetch (None = wait forever)
    pub fetch_timeout: Option<Duration>,
    /// Rules handed to the diff engine
    pub diff: DiffOptions,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            feed_locator: DEFAULT_FEED_LOCATOR.to_string(),
            workers: DEFAULT_WORKERS,
            fetch_timeout: Some(DEFAULT_FETCH_TIMEOUT),
            diff: DiffOptions::default(),
        }
    }
}
