use crate::prompt::{prompt, prompt_chapters, prompt_formats, prompt_password, prompt_reports};
use anyhow::Context;
use nessus_walker::{
    model::report::ReportDescriptor,
    selection::{ChapterSelection, FormatSelection, ReportSelection, Selection},
    session::{Credentials, DEFAULT_PORT},
    source::HttpOptions,
    visitors::store::StoreVisitor,
};
use std::path::PathBuf;
use url::Url;

pub mod download;
pub mod list;

#[derive(Debug, clap::Parser)]
#[command(next_help_heading = "Server")]
pub struct ServerArguments {
    /// Hostname or IP address of the scanner's management interface.
    pub server: String,

    /// Port of the management interface.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ServerArguments {
    pub fn url(&self) -> anyhow::Result<Url> {
        Url::parse(&format!("https://{}:{}/", self.server, self.port))
            .with_context(|| format!("Invalid server address: {}:{}", self.server, self.port))
    }
}

#[derive(Debug, clap::Parser)]
#[command(next_help_heading = "Authentication")]
pub struct AuthArguments {
    /// Username, prompted for when absent.
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password, prompted for (without echo) when absent.
    #[arg(long, env = "NESSUS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl AuthArguments {
    pub fn credentials(self) -> anyhow::Result<Credentials> {
        let username = match self.username {
            Some(username) => username,
            None => prompt("Enter your username: ").context("Failed to read username")?,
        };
        let password = match self.password {
            Some(password) => password,
            None => prompt_password("Enter your password (will not echo): ")
                .context("Failed to read password")?,
        };

        Ok(Credentials { username, password })
    }
}

#[derive(Debug, clap::Parser)]
#[command(next_help_heading = "Selection")]
pub struct SelectionArguments {
    /// Reports to download: comma separated indices, or `all`. Prompted for when absent.
    #[arg(short = 'R', long)]
    pub reports: Option<String>,

    /// File types to download: comma separated codes 0-4, or `all`. Prompted for when absent.
    #[arg(short, long)]
    pub formats: Option<String>,

    /// Chapters for HTML/PDF output: comma separated codes 0-5, or `all`. Prompted for when
    /// needed and absent.
    #[arg(short, long)]
    pub chapters: Option<String>,
}

impl SelectionArguments {
    /// Resolve into a full selection, prompting for whatever was not passed as a flag.
    pub fn into_selection(self, reports: &[ReportDescriptor]) -> anyhow::Result<Selection> {
        let input = match self.reports {
            Some(input) => input,
            None => prompt_reports(reports).context("Failed to read report selection")?,
        };
        let report_selection =
            ReportSelection::parse(&input).context("Invalid report selection")?;

        let input = match self.formats {
            Some(input) => input,
            None => prompt_formats().context("Failed to read file type selection")?,
        };
        let format_selection =
            FormatSelection::parse(&input).context("Invalid file type selection")?;

        let chapter_selection = match format_selection.needs_chapters() {
            true => {
                let input = match self.chapters {
                    Some(input) => input,
                    None => prompt_chapters().context("Failed to read chapter selection")?,
                };
                ChapterSelection::parse(&input).context("Invalid chapter selection")?
            }
            false => ChapterSelection::default(),
        };

        Ok(Selection {
            reports: report_selection,
            formats: format_selection,
            chapters: chapter_selection,
        })
    }
}

#[derive(Debug, clap::Parser)]
#[command(next_help_heading = "Polling")]
pub struct PollArguments {
    /// Wait before the first poll of a report the server is still rendering.
    #[arg(long, default_value = "5s")]
    pub initial_delay: humantime::Duration,

    /// Interval between polls while the report keeps rendering.
    #[arg(long, default_value = "2s")]
    pub poll_interval: humantime::Duration,

    /// Give up after this many polls of a report that keeps rendering.
    #[arg(long, default_value = "150")]
    pub poll_limit: usize,
}

impl From<PollArguments> for HttpOptions {
    fn from(value: PollArguments) -> Self {
        HttpOptions::new()
            .initial_delay(value.initial_delay)
            .poll_interval(value.poll_interval)
            .poll_limit(value.poll_limit)
    }
}

#[derive(Debug, clap::Parser)]
#[command(next_help_heading = "Storage")]
pub struct StoreArguments {
    /// Output directory for downloaded reports. Prompted for when absent.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable applying the modification timestamp to the downloaded file.
    #[arg(long)]
    pub no_timestamps: bool,
}

impl StoreArguments {
    pub fn into_visitor(self) -> anyhow::Result<StoreVisitor> {
        let base = match self.output {
            Some(base) => base,
            None => prompt("Path to save reports to: ")
                .context("Failed to read output directory")?
                .into(),
        };

        Ok(StoreVisitor::new(base).no_timestamps(self.no_timestamps))
    }
}
