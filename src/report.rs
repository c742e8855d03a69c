// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::{self, BufRead, Write};

use crate::episode::canonical_name;
use crate::scan::DirectoryResult;

/// Message printed when the operator declines the download
pub const FAREWELL: &str = "Nothing downloaded, kthxbye";

/// What the operator decided after seeing the scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// No directory has new episodes; nothing was shown
    NothingNew,
    /// The operator declined
    Cancelled,
    /// New episodes should be downloaded
    Confirmed,
}

/// Check whether any directory has at least one new episode
pub fn has_new_episodes(results: &[DirectoryResult]) -> bool {
    results.iter().any(|r| !r.new_episodes.is_empty())
}

/// Write the new episodes of every directory that has some, newest first
pub fn write_report<W: Write>(out: &mut W, results: &[DirectoryResult]) -> io::Result<()> {
    for result in results.iter().filter(|r| !r.new_episodes.is_empty()) {
        writeln!(out, "> New files for {}:", result.name)?;
        for url in &result.new_episodes {
            writeln!(out, "{}", canonical_name(url))?;
        }
    }
    Ok(())
}

/// Interpret the operator's answer: empty or anything starting with y/Y proceeds
pub fn parse_confirmation(answer: &str) -> bool {
    let answer = answer.trim_end_matches(['\r', '\n']);
    answer.is_empty() || answer.starts_with(['y', 'Y'])
}

/// Ask whether to download and read a single line of input
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    write!(out, "Download? (Y/n) > ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(parse_confirmation(&answer))
}

/// Show the scan results and ask the operator whether to download.
///
/// Nothing is written and no input is read when there is nothing new.
/// With `auto_confirm` the report is shown but the question is skipped.
pub fn review_results<R: BufRead, W: Write>(
    results: &[DirectoryResult],
    input: &mut R,
    out: &mut W,
    auto_confirm: bool,
) -> io::Result<ReviewOutcome> {
    if !has_new_episodes(results) {
        return Ok(ReviewOutcome::NothingNew);
    }

    write_report(out, results)?;

    if auto_confirm || confirm(input, out)? {
        Ok(ReviewOutcome::Confirmed)
    } else {
        writeln!(out, "{FAREWELL}")?;
        Ok(ReviewOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(name: &str, urls: &[&str]) -> DirectoryResult {
        DirectoryResult {
            name: name.to_string(),
            path: PathBuf::from(name),
            new_episodes: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    fn sample_results() -> Vec<DirectoryResult> {
        vec![
            result("showA", &["https://a.example/3.mp3", "https://a.example/2.mp3"]),
            result("showB", &[]),
            result("showC", &["https://c.example/ep.mp3?id=9"]),
        ]
    }

    #[test]
    fn detects_new_episodes() {
        assert!(has_new_episodes(&sample_results()));
        assert!(!has_new_episodes(&[result("showB", &[])]));
        assert!(!has_new_episodes(&[]));
    }

    #[test]
    fn report_lists_directories_with_new_episodes() {
        let mut out = Vec::new();
        write_report(&mut out, &sample_results()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "> New files for showA:\n3.mp3\n2.mp3\n> New files for showC:\nep.mp3\n"
        );
    }

    #[test]
    fn confirmation_defaults_to_yes() {
        assert!(parse_confirmation(""));
        assert!(parse_confirmation("\n"));
        assert!(parse_confirmation("\r\n"));
        assert!(parse_confirmation("y"));
        assert!(parse_confirmation("Yes\n"));
        assert!(parse_confirmation("yolo"));
    }

    #[test]
    fn confirmation_rejects_other_answers() {
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("No\n"));
        assert!(!parse_confirmation(" y"));
        assert!(!parse_confirmation("q"));
    }

    #[test]
    fn confirm_prompts_and_reads_one_line() {
        let mut input = "n\ny\n".as_bytes();
        let mut out = Vec::new();

        assert!(!confirm(&mut input, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Download? (Y/n) > ");
        assert_eq!(input, b"y\n");
    }

    #[test]
    fn confirm_accepts_end_of_input() {
        let mut input = "".as_bytes();
        let mut out = Vec::new();

        assert!(confirm(&mut input, &mut out).unwrap());
    }

    #[test]
    fn review_skips_prompt_when_nothing_is_new() {
        let mut input = "n\n".as_bytes();
        let mut out = Vec::new();

        let outcome = review_results(&[result("showB", &[])], &mut input, &mut out, false).unwrap();

        assert_eq!(outcome, ReviewOutcome::NothingNew);
        assert!(out.is_empty());
        assert_eq!(input, b"n\n");
    }

    #[test]
    fn review_cancels_on_no() {
        let mut input = "n\n".as_bytes();
        let mut out = Vec::new();

        let outcome = review_results(&sample_results(), &mut input, &mut out, false).unwrap();

        assert_eq!(outcome, ReviewOutcome::Cancelled);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Download? (Y/n) > "));
        assert!(printed.ends_with(&format!("{FAREWELL}\n")));
    }

    #[test]
    fn review_confirms_on_enter() {
        let mut input = "\n".as_bytes();
        let mut out = Vec::new();

        let outcome = review_results(&sample_results(), &mut input, &mut out, false).unwrap();
        assert_eq!(outcome, ReviewOutcome::Confirmed);
    }

    #[test]
    fn review_auto_confirm_skips_question() {
        let mut input = "n\n".as_bytes();
        let mut out = Vec::new();

        let outcome = review_results(&sample_results(), &mut input, &mut out, true).unwrap();

        assert_eq!(outcome, ReviewOutcome::Confirmed);
        assert!(!String::from_utf8(out).unwrap().contains("Download?"));
    }
}
