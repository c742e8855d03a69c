// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod config;
pub mod episode;
pub mod error;
pub mod feed;
pub mod http;
pub mod progress;
pub mod report;
pub mod scan;
pub mod state;

// Re-export main types for convenience
pub use config::{CheckOptions, DiffOptions};
pub use episode::{
    DispatchSummary, canonical_name, dispatch_downloads, is_transfer_equivalent,
    locate_executable,
};
pub use error::{DispatchError, FeedError, ScanError, StateError};
pub use feed::{fetch_episode_urls, parse_episode_urls};
pub use http::{HttpClient, ReqwestClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use report::{ReviewOutcome, review_results};
pub use scan::{DirectoryResult, PodcastDir, check_podcasts, find_podcast_dirs, scan_dirs};
pub use state::{find_new_episodes, scan_local_files};
