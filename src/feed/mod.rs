// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod fetch;
mod parse;

pub use fetch::{fetch_episode_urls, fetch_feed_bytes, is_url, read_feed_file, read_feed_locator};
pub use parse::parse_episode_urls;
