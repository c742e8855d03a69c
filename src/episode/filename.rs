// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// File name an episode gets once downloaded: the last path segment of its URL.
///
/// The segment is taken from the URL as published, without any re-encoding,
/// so non-ASCII characters and spaces stay as they are. Query and fragment
/// are not part of the name and trailing slashes are ignored.
pub fn canonical_name(episode_url: &str) -> &str {
    let path_end = episode_url.find(['?', '#']).unwrap_or(episode_url.len());
    base_name(&episode_url[..path_end])
}

/// Last component of a `/`-separated path, ignoring trailing slashes
fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Check whether two file names denote the same episode.
///
/// Names match when identical or when one is the other plus the transfer suffix.
pub fn is_transfer_equivalent(a: &str, b: &str, transfer_suffix: &str) -> bool {
    a == b
        || b.strip_suffix(transfer_suffix) == Some(a)
        || a.strip_suffix(transfer_suffix) == Some(b)
}
