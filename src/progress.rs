// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

/// Events emitted while checking directories and dispatching downloads
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Directory checks are about to start
    ScanStarted { directories: usize },

    /// A directory has been checked
    DirectoryChecked {
        directory: String,
        new_episodes: usize,
    },

    /// A directory could not be opened or listed
    DirectoryUnreadable { directory: String, error: String },

    /// The feed of a directory could not be fetched or parsed
    FeedFailed { directory: String, error: String },

    /// Checking a directory was aborted, e.g. by a panic
    DirectoryCheckFailed { directory: String, error: String },

    /// All directories have been checked
    ScanCompleted {
        directories: usize,
        /// Directories with at least one new episode
        with_new_episodes: usize,
    },

    /// A downloader process has been started
    DownloadSpawned { directory: String, file_name: String },

    /// A downloader process could not be started
    DownloadSpawnFailed {
        directory: String,
        file_name: String,
        error: String,
    },

    /// Every started downloader process has exited
    DownloadsFinished {
        spawned: usize,
        spawn_failed: usize,
        /// Processes that exited with a non-zero status
        exit_failures: usize,
    },
}

/// Trait for reporting progress events.
///
/// Implementations can use this to display spinners, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
