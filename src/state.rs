// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::config::DiffOptions;
use crate::episode::{canonical_name, is_transfer_equivalent};
use crate::error::StateError;

/// List the names of all entries in a podcast directory.
///
/// Names are sorted lexically, so the last entries are the newest ones for
/// feeds whose file names sort in publication order.
pub async fn scan_local_files(dir: &Path) -> Result<Vec<String>, StateError> {
    let read_error = |e: std::io::Error| StateError::ReadDirectoryFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_error)?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    names.sort();
    Ok(names)
}

/// Determine which remote episodes have not been downloaded yet.
///
/// `remote` is ordered newest first. The result is always a prefix of
/// `remote`: the episodes newer than the newest one already present locally.
///
/// Fast path: when the newest remote episode matches one of the last
/// `look_ahead` local entries, nothing is considered new. Older remote
/// episodes are not checked in that case; an episode that is present locally
/// implies that everything published before it is present too.
///
/// Otherwise the remote list is walked until the first episode known
/// locally, either finished or as an in-progress transfer.
pub fn find_new_episodes<'a>(
    remote: &'a [String],
    local: &[String],
    rules: &DiffOptions,
) -> &'a [String] {
    let Some(newest) = remote.first() else {
        return remote;
    };

    let newest_name = canonical_name(newest);
    let newest_present = local
        .iter()
        .rev()
        .take(rules.look_ahead)
        .any(|name| is_transfer_equivalent(newest_name, name, &rules.transfer_suffix));

    if newest_present {
        debug!(newest = %newest_name, "newest episode already present");
        return &remote[..0];
    }

    let suffix = rules.transfer_suffix.as_str();
    let mut known: HashSet<&str> = HashSet::with_capacity(local.len() * 2);
    let mut suffixed: HashSet<String> = HashSet::with_capacity(local.len());
    for name in local {
        known.insert(name.as_str());
        if let Some(stem) = name.strip_suffix(suffix) {
            known.insert(stem);
        }
        suffixed.insert(format!("{name}{suffix}"));
    }

    match remote
        .iter()
        .map(|url| canonical_name(url))
        .position(|name| known.contains(name) || suffixed.contains(name))
    {
        Some(first_known) => &remote[..first_known],
        None => remote,
    }
}
