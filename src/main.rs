// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use podcatch::config::{
    DEFAULT_DOWNLOADER, DEFAULT_FEED_LOCATOR, DEFAULT_FETCH_TIMEOUT, DEFAULT_LOG_FILTER,
    DEFAULT_LOOK_AHEAD, DEFAULT_TRANSFER_SUFFIX, DEFAULT_WORKERS,
};
use podcatch::{
    CheckOptions, DiffOptions, NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient,
    ReviewOutcome, SharedProgressReporter, dispatch_downloads, find_podcast_dirs,
    locate_executable, review_results, scan_dirs,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static CHECKED: Emoji<'_, '_> = Emoji("✔ ", "[+] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");

/// Check podcast directories for new episodes and download them with aria2c
#[derive(Parser, Debug)]
#[command(name = "podcatch")]
#[command(about = "Check podcast directories for new episodes and download them")]
#[command(version)]
struct Args {
    /// Only check subdirectories whose name contains this text
    filter: Option<String>,

    /// Number of trailing local files compared against the newest episode
    #[arg(long, default_value_t = DEFAULT_LOOK_AHEAD)]
    look_ahead: usize,

    /// Number of directories checked concurrently
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Feed fetch timeout in seconds (0 = no timeout)
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    timeout: u64,

    /// Downloader executable, looked up in PATH
    #[arg(long, default_value = DEFAULT_DOWNLOADER)]
    downloader: String,

    /// Download without asking
    #[arg(short, long)]
    yes: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn check_options(&self) -> CheckOptions {
        CheckOptions {
            feed_locator: DEFAULT_FEED_LOCATOR.to_string(),
            workers: self.workers,
            fetch_timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
            diff: DiffOptions {
                look_ahead: self.look_ahead,
                transfer_suffix: DEFAULT_TRANSFER_SUFFIX.to_string(),
            },
        }
    }
}

/// Progress reporter using an indicatif spinner while directories are checked
struct IndicatifReporter {
    main_bar: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Self {
        let main_style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let main_bar = ProgressBar::new_spinner();
        main_bar.set_style(main_style);
        main_bar.enable_steady_tick(Duration::from_millis(100));

        Self { main_bar }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::ScanStarted { directories } => {
                self.main_bar.set_message(format!(
                    "{SEARCH}Checking {} podcasts",
                    directories.to_string().cyan()
                ));
            }

            ProgressEvent::DirectoryChecked {
                directory,
                new_episodes,
            } => {
                let new = if new_episodes > 0 {
                    format!("{} new", new_episodes).yellow().bold()
                } else {
                    "up to date".dimmed()
                };
                self.main_bar
                    .println(format!("{CHECKED}Checked {} ({new})", directory.cyan()));
            }

            ProgressEvent::DirectoryUnreadable { directory, error } => {
                self.main_bar.println(format!(
                    "{FAILURE}Cannot read {}: {}",
                    directory.yellow(),
                    error.red()
                ));
            }

            ProgressEvent::FeedFailed { directory, error } => {
                self.main_bar.println(format!(
                    "{FAILURE}Error with feed {}: {}",
                    directory.yellow(),
                    error.red()
                ));
            }

            ProgressEvent::DirectoryCheckFailed { directory, error } => {
                self.main_bar.println(format!(
                    "{FAILURE}Check of {} aborted: {}",
                    directory.yellow(),
                    error.red()
                ));
            }

            ProgressEvent::ScanCompleted {
                directories,
                with_new_episodes,
            } => {
                self.main_bar.finish_and_clear();
                println!(
                    "\n{} {} checked, {} with new episodes\n",
                    "Scan complete:".bold().green(),
                    directories.to_string().cyan(),
                    if with_new_episodes > 0 {
                        with_new_episodes.to_string().yellow().bold()
                    } else {
                        with_new_episodes.to_string().green()
                    }
                );
            }

            ProgressEvent::DownloadSpawned {
                directory,
                file_name,
            } => {
                println!("{DOWNLOAD}{} → {}", file_name.green(), directory.cyan());
            }

            ProgressEvent::DownloadSpawnFailed {
                directory,
                file_name,
                error,
            } => {
                eprintln!(
                    "{FAILURE}Error downloading {} for {}: {}",
                    file_name.yellow(),
                    directory.cyan(),
                    error.red()
                );
            }

            ProgressEvent::DownloadsFinished {
                spawned,
                spawn_failed,
                exit_failures,
            } => {
                println!(
                    "\n{PARTY}{} {} started, {} failed to start, {} exited with errors",
                    "Downloads finished:".bold().green(),
                    spawned.to_string().green().bold(),
                    if spawn_failed > 0 {
                        spawn_failed.to_string().red().bold()
                    } else {
                        spawn_failed.to_string().green()
                    },
                    if exit_failures > 0 {
                        exit_failures.to_string().red().bold()
                    } else {
                        exit_failures.to_string().green()
                    }
                );
            }
        }
    }
}

fn build_client(timeout: Option<Duration>) -> Result<ReqwestClient> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("podcatch/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(ReqwestClient::with_client(builder.build()?))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A subscriber may already be installed; logging is best effort
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podcatch".bold().magenta(),
            "- Podcast Checker".dimmed()
        );
    }

    let options = args.check_options();
    let filter = args.filter.as_deref().unwrap_or("");

    let dirs = match find_podcast_dirs(Path::new("."), filter, &options.feed_locator) {
        Ok(dirs) => dirs,
        Err(e) => {
            println!("{FAILURE}{}", e.to_string().red());
            return Ok(());
        }
    };

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let client = build_client(options.fetch_timeout).context("Failed to create HTTP client")?;
    let results = scan_dirs(&client, dirs, &options, reporter.clone()).await;

    let outcome = {
        let mut input = io::stdin().lock();
        let mut out = io::stdout().lock();
        review_results(&results, &mut input, &mut out, args.yes)
            .context("Failed to ask for confirmation")?
    };

    if outcome != ReviewOutcome::Confirmed {
        return Ok(());
    }

    let downloader = match locate_executable(&args.downloader) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{FAILURE}{}", e.to_string().red());
            std::process::exit(1);
        }
    };

    dispatch_downloads(&downloader, &results, &reporter).await;

    Ok(())
}
