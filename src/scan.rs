// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::config::CheckOptions;
use crate::error::{FeedError, ScanError};
use crate::feed::{fetch_episode_urls, read_feed_locator};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::state::{find_new_episodes, scan_local_files};

/// A subdirectory of the scan root that tracks one podcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastDir {
    /// Directory name relative to the scan root
    pub name: String,
    pub path: PathBuf,
}

/// New episodes found for one podcast directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResult {
    pub name: String,
    pub path: PathBuf,
    /// Episode URLs not present locally, newest first
    pub new_episodes: Vec<String>,
}

impl DirectoryResult {
    fn empty(dir: &PodcastDir) -> Self {
        Self {
            name: dir.name.clone(),
            path: dir.path.clone(),
            new_episodes: Vec::new(),
        }
    }
}

/// Find the podcast directories below `root`.
///
/// A podcast directory is an immediate subdirectory whose name contains
/// `filter` and which holds a feed locator file. The result is sorted by name.
pub fn find_podcast_dirs(
    root: &Path,
    filter: &str,
    feed_locator: &str,
) -> Result<Vec<PodcastDir>, ScanError> {
    let read_error = |e: std::io::Error| ScanError::ReadRootFailed {
        path: root.to_path_buf(),
        source: e,
    };

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!(name = ?raw, "skipping directory with non UTF-8 name");
                continue;
            }
        };
        if name == "." || name == ".." || !name.contains(filter) {
            continue;
        }

        let path = entry.path();
        if !path.is_dir() || !path.join(feed_locator).exists() {
            continue;
        }

        dirs.push(PodcastDir { name, path });
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dirs)
}

/// Check a single podcast directory for new episodes.
///
/// Never fails: an unreadable directory or a broken feed yields a result
/// without new episodes, reported through `reporter`.
pub async fn check_dir<C: HttpClient + ?Sized>(
    client: &C,
    dir: &PodcastDir,
    options: &CheckOptions,
    reporter: &SharedProgressReporter,
) -> DirectoryResult {
    // Bail out early, before any network traffic, if the directory is unusable
    if let Err(e) = tokio::fs::read_dir(&dir.path).await {
        warn!(directory = %dir.name, error = %e, "cannot open podcast directory");
        reporter.report(ProgressEvent::DirectoryUnreadable {
            directory: dir.name.clone(),
            error: e.to_string(),
        });
        return DirectoryResult::empty(dir);
    }

    let (local, remote) = tokio::join!(
        scan_local_files(&dir.path),
        fetch_with_timeout(client, dir, options)
    );

    let local = match local {
        Ok(local) => local,
        Err(e) => {
            warn!(directory = %dir.name, error = %e, "cannot list podcast directory");
            reporter.report(ProgressEvent::DirectoryUnreadable {
                directory: dir.name.clone(),
                error: e.to_string(),
            });
            return DirectoryResult::empty(dir);
        }
    };

    let remote = match remote {
        Ok(remote) => remote,
        Err(e) => {
            warn!(directory = %dir.name, error = %e, "feed check failed");
            reporter.report(ProgressEvent::FeedFailed {
                directory: dir.name.clone(),
                error: e.to_string(),
            });
            Vec::new()
        }
    };

    let new_episodes = find_new_episodes(&remote, &local, &options.diff).to_vec();
    debug!(
        directory = %dir.name,
        remote = remote.len(),
        local = local.len(),
        new = new_episodes.len(),
        "directory checked"
    );

    DirectoryResult {
        name: dir.name.clone(),
        path: dir.path.clone(),
        new_episodes,
    }
}

async fn fetch_with_timeout<C: HttpClient + ?Sized>(
    client: &C,
    dir: &PodcastDir,
    options: &CheckOptions,
) -> Result<Vec<String>, FeedError> {
    let fetch = fetch_episode_urls(client, &dir.path, &options.feed_locator);

    let Some(timeout) = options.fetch_timeout else {
        return fetch.await;
    };

    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => {
            let url = read_feed_locator(&dir.path, &options.feed_locator)
                .await
                .unwrap_or_else(|_| dir.name.clone());
            Err(FeedError::TimedOut { url, timeout })
        }
    }
}

/// Check all directories on a fixed pool of workers.
///
/// Workers pull directories from a shared queue until it is closed and send
/// each result to a single collector. Results are returned sorted by
/// directory name; `DirectoryChecked` events follow completion order.
pub async fn scan_dirs<C: HttpClient + Clone + 'static>(
    client: &C,
    dirs: Vec<PodcastDir>,
    options: &CheckOptions,
    reporter: SharedProgressReporter,
) -> Vec<DirectoryResult> {
    let total = dirs.len();
    reporter.report(ProgressEvent::ScanStarted { directories: total });

    let (work_tx, work_rx) = mpsc::channel(total.max(1));
    for dir in dirs {
        // Capacity covers every directory, so this never waits
        if work_tx.send(dir).await.is_err() {
            break;
        }
    }
    // Closing the queue tells idle workers to stop
    drop(work_tx);

    let work_rx = Arc::new(Mutex::new(work_rx));
    let (result_tx, mut result_rx) = mpsc::unbounded_channel();

    let mut handles = Vec::new();
    for worker in 0..options.workers.max(1) {
        let work_rx = work_rx.clone();
        let result_tx = result_tx.clone();
        let client = client.clone();
        let options = options.clone();
        let reporter = reporter.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let next = work_rx.lock().await.recv().await;
                let Some(dir) = next else {
                    debug!(worker, "work queue closed");
                    break;
                };

                // A panicking check must not take the worker or the directory down with it
                let check = {
                    let client = client.clone();
                    let dir = dir.clone();
                    let options = options.clone();
                    let reporter = reporter.clone();
                    tokio::spawn(async move { check_dir(&client, &dir, &options, &reporter).await })
                };

                let result = match check.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(directory = %dir.name, error = %e, "directory check aborted");
                        reporter.report(ProgressEvent::DirectoryCheckFailed {
                            directory: dir.name.clone(),
                            error: e.to_string(),
                        });
                        DirectoryResult::empty(&dir)
                    }
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        }));
    }
    // The collector stops once every worker has dropped its sender
    drop(result_tx);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        reporter.report(ProgressEvent::DirectoryChecked {
            directory: result.name.clone(),
            new_episodes: result.new_episodes.len(),
        });
        results.push(result);
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "scan worker failed");
        }
    }

    results.sort_by(|a, b| a.name.cmp(&b.name));

    reporter.report(ProgressEvent::ScanCompleted {
        directories: results.len(),
        with_new_episodes: results
            .iter()
            .filter(|r| !r.new_episodes.is_empty())
            .count(),
    });

    results
}

/// Find the podcast directories below `root` and check all of them
pub async fn check_podcasts<C: HttpClient + Clone + 'static>(
    client: &C,
    root: &Path,
    filter: &str,
    options: &CheckOptions,
    reporter: SharedProgressReporter,
) -> Result<Vec<DirectoryResult>, ScanError> {
    let dirs = find_podcast_dirs(root, filter, &options.feed_locator)?;
    Ok(scan_dirs(client, dirs, options, reporter).await)
}
