#![forbid(unsafe_code)]

mod cmd;
mod common;
mod prompt;

use clap::Parser;
use cmd::{download::Download, list::List};
use nessus_common::{cli::CommandDefaults, cli::log::Logging, utils::MeasureTime};
use std::{ops::Deref, process::ExitCode};

#[derive(Debug, Parser)]
#[command(version, about = "Nessus report download tool", author, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    logging: Logging,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    List(List),
    Download(Download),
}

impl Deref for Command {
    type Target = dyn CommandDefaults;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::List(cmd) => cmd,
            Self::Download(cmd) => cmd,
        }
    }
}

impl Command {
    pub async fn run<P: nessus_common::progress::Progress + Clone>(
        self,
        progress: P,
    ) -> anyhow::Result<()> {
        match self {
            Self::List(cmd) => cmd.run(progress).await,
            Self::Download(cmd) => cmd.run(progress).await,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let progress = self
            .logging
            .init(&["nessus_dl", "nessus_walker"], self.command.progress());

        // run

        log::debug!("Setup complete, start processing");

        let time = MeasureTime::new();
        self.command.run(progress).await?;
        drop(time);

        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = Cli::parse().run().await {
        log::error!("Failed to execute: {err}");
        for (n, cause) in err.chain().enumerate().skip(1) {
            log::info!("  {n}: {cause}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
