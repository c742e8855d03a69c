// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::scan::DirectoryResult;

use super::filename::canonical_name;

/// Outcome of handing new episodes to the downloader
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    /// Number of downloader processes started
    pub spawned: usize,
    /// Episodes whose downloader could not be started (file name, error)
    pub spawn_failed: Vec<(String, String)>,
    /// Started processes that exited unsuccessfully
    pub exit_failures: usize,
}

/// Resolve the downloader executable.
///
/// Names containing a path separator are used as given, anything else is
/// searched in every `PATH` entry.
pub fn locate_executable(name: &str) -> Result<PathBuf, DispatchError> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(DispatchError::DownloaderNotFound {
                name: name.to_string(),
            })
        };
    }

    let search_paths: Vec<PathBuf> = std::env::var_os("PATH")
        .map_or_else(Vec::new, |paths| std::env::split_paths(&paths).collect());
    locate_in(name, &search_paths)
}

fn locate_in(name: &str, search_paths: &[PathBuf]) -> Result<PathBuf, DispatchError> {
    let suffix = std::env::consts::EXE_SUFFIX;

    for dir in search_paths {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Ok(candidate);
        }
        if !suffix.is_empty() {
            let candidate = dir.join(format!("{name}{suffix}"));
            if is_executable(&candidate) {
                return Ok(candidate);
            }
        }
    }

    Err(DispatchError::DownloaderNotFound {
        name: name.to_string(),
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Downloader arguments for one episode: no preallocation, no seeding
pub fn downloader_args(dest_dir: &Path, file_name: &str, url: &str) -> Vec<OsString> {
    vec![
        "--file-allocation=none".into(),
        "--seed-time=0".into(),
        "-d".into(),
        dest_dir.as_os_str().to_os_string(),
        "-o".into(),
        file_name.into(),
        url.into(),
    ]
}

/// Start the downloader for a single episode, attached to our terminal
pub fn spawn_download(
    downloader: &Path,
    dest_dir: &Path,
    file_name: &str,
    url: &str,
) -> Result<Child, DispatchError> {
    debug!(
        downloader = %downloader.display(),
        dest = %dest_dir.display(),
        file_name,
        url,
        "spawning downloader"
    );

    Command::new(downloader)
        .args(downloader_args(dest_dir, file_name, url))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| DispatchError::SpawnFailed {
            program: downloader.to_path_buf(),
            source: e,
        })
}

/// Start one downloader per new episode, then wait for all of them.
///
/// Episodes whose downloader cannot be started are skipped. Every started
/// process is awaited, whatever its exit status.
pub async fn dispatch_downloads(
    downloader: &Path,
    results: &[DirectoryResult],
    reporter: &SharedProgressReporter,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    let mut children = Vec::new();

    for result in results {
        for url in &result.new_episodes {
            let file_name = canonical_name(url).to_string();

            match spawn_download(downloader, &result.path, &file_name, url) {
                Ok(child) => {
                    reporter.report(ProgressEvent::DownloadSpawned {
                        directory: result.name.clone(),
                        file_name: file_name.clone(),
                    });
                    children.push((file_name, child));
                }
                Err(e) => {
                    reporter.report(ProgressEvent::DownloadSpawnFailed {
                        directory: result.name.clone(),
                        file_name: file_name.clone(),
                        error: e.to_string(),
                    });
                    summary.spawn_failed.push((file_name, e.to_string()));
                }
            }
        }
    }

    summary.spawned = children.len();

    for (file_name, mut child) in children {
        match child.wait().await {
            Ok(status) if status.success() => {}
            Ok(status) => {
                warn!(file_name, %status, "downloader exited unsuccessfully");
                summary.exit_failures += 1;
            }
            Err(e) => {
                warn!(file_name, error = %e, "failed to wait for downloader");
                summary.exit_failures += 1;
            }
        }
    }

    reporter.report(ProgressEvent::DownloadsFinished {
        spawned: summary.spawned,
        spawn_failed: summary.spawn_failed.len(),
        exit_failures: summary.exit_failures,
    });

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopReporter;
    use tempfile::tempdir;

    fn result_for(dir: &Path, urls: &[&str]) -> DirectoryResult {
        DirectoryResult {
            name: "showA".to_string(),
            path: dir.to_path_buf(),
            new_episodes: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn downloader_args_match_aria2_contract() {
        let args = downloader_args(
            Path::new("showA"),
            "ep1.mp3",
            "https://example.com/ep1.mp3",
        );

        assert_eq!(
            args,
            vec![
                OsString::from("--file-allocation=none"),
                OsString::from("--seed-time=0"),
                OsString::from("-d"),
                OsString::from("showA"),
                OsString::from("-o"),
                OsString::from("ep1.mp3"),
                OsString::from("https://example.com/ep1.mp3"),
            ]
        );
    }

    #[test]
    fn missing_downloader_is_reported() {
        let result = locate_executable("podcatch-no-such-downloader");

        assert!(matches!(
            result,
            Err(DispatchError::DownloaderNotFound { name })
                if name == "podcatch-no-such-downloader"
        ));
    }

    #[test]
    fn missing_explicit_path_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aria2c");

        let result = locate_executable(path.to_str().unwrap());
        assert!(matches!(result, Err(DispatchError::DownloaderNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn locate_searches_every_path_entry() {
        use std::os::unix::fs::PermissionsExt;

        let empty = tempdir().unwrap();
        let bin = tempdir().unwrap();
        let exe = bin.path().join("aria2c");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = locate_in(
            "aria2c",
            &[empty.path().to_path_buf(), bin.path().to_path_buf()],
        )
        .unwrap();
        assert_eq!(found, exe);
    }

    #[cfg(unix)]
    #[test]
    fn locate_skips_non_executable_files() {
        let bin = tempdir().unwrap();
        std::fs::write(bin.path().join("aria2c"), "not a program").unwrap();

        let result = locate_in("aria2c", &[bin.path().to_path_buf()]);
        assert!(matches!(result, Err(DispatchError::DownloaderNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dispatch_spawns_one_process_per_episode() {
        let dir = tempdir().unwrap();
        let downloader = locate_executable("true").unwrap();
        let results = vec![
            result_for(
                dir.path(),
                &["https://example.com/2.mp3", "https://example.com/1.mp3"],
            ),
            result_for(dir.path(), &[]),
        ];

        let summary = dispatch_downloads(&downloader, &results, &NoopReporter::shared()).await;

        assert_eq!(summary.spawned, 2);
        assert!(summary.spawn_failed.is_empty());
        assert_eq!(summary.exit_failures, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dispatch_counts_unsuccessful_exits() {
        let dir = tempdir().unwrap();
        let downloader = locate_executable("false").unwrap();
        let results = vec![result_for(dir.path(), &["https://example.com/1.mp3"])];

        let summary = dispatch_downloads(&downloader, &results, &NoopReporter::shared()).await;

        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.exit_failures, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dispatch_passes_destination_and_name() {
        use std::os::unix::fs::PermissionsExt;

        let bin = tempdir().unwrap();
        let show = tempdir().unwrap();
        let script = bin.path().join("fake-aria2c");
        let body = "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$4/$6.args\"\n";
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let results = vec![result_for(
            show.path(),
            &["https://example.com/feed/ep7.mp3?x=1"],
        )];
        let summary = dispatch_downloads(&script, &results, &NoopReporter::shared()).await;

        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.exit_failures, 0);

        let recorded = std::fs::read_to_string(show.path().join("ep7.mp3.args")).unwrap();
        let lines: Vec<&str> = recorded.lines().collect();
        assert_eq!(lines[0], "--file-allocation=none");
        assert_eq!(lines[1], "--seed-time=0");
        assert_eq!(lines[5], "ep7.mp3");
        assert_eq!(lines[6], "https://example.com/feed/ep7.mp3?x=1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dispatch_skips_episodes_that_fail_to_spawn() {
        let dir = tempdir().unwrap();
        // Exists but is not executable, so every spawn fails
        let downloader = dir.path().join("aria2c");
        std::fs::write(&downloader, "not a program").unwrap();
        let results = vec![result_for(
            dir.path(),
            &["https://example.com/2.mp3", "https://example.com/1.mp3"],
        )];

        let reporter = std::sync::Arc::new(crate::progress::tests::RecordingReporter::default());
        let shared: SharedProgressReporter = reporter.clone();
        let summary = dispatch_downloads(&downloader, &results, &shared).await;

        assert_eq!(summary.spawned, 0);
        assert_eq!(summary.spawn_failed.len(), 2);
        assert_eq!(summary.spawn_failed[0].0, "2.mp3");
        assert_eq!(summary.spawn_failed[1].0, "1.mp3");

        let failures = reporter
            .events()
            .into_iter()
            .filter(|e| matches!(e, ProgressEvent::DownloadSpawnFailed { .. }))
            .count();
        assert_eq!(failures, 2);
    }
}
