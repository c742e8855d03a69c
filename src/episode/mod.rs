// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod download;
mod filename;

pub use download::{
    DispatchSummary, dispatch_downloads, downloader_args, locate_executable, spawn_download,
};
pub use filename::{canonical_name, is_transfer_equivalent};
