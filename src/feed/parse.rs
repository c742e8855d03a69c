// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::debug;

use crate::error::FeedError;

/// Parse RSS feed XML bytes into the ordered list of enclosure URLs.
///
/// The order of the feed is kept as is (feeds publish newest first).
/// Items without an enclosure, or with an empty enclosure URL, are skipped.
pub fn parse_episode_urls(xml_bytes: &[u8]) -> Result<Vec<String>, FeedError> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    let urls = channel
        .items()
        .iter()
        .filter_map(|item| match item.enclosure().map(|e| e.url().trim()) {
            Some(url) if !url.is_empty() => Some(url.to_string()),
            _ => {
                debug!(
                    title = item.title().unwrap_or("Untitled Episode"),
                    "skipping feed item without enclosure"
                );
                None
            }
        })
        .collect();

    Ok(urls)
}
