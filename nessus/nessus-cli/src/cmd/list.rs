use crate::{
    cmd::{AuthArguments, ServerArguments},
    common::new_session,
};
use anyhow::Context;
use nessus_common::{
    cli::{CommandDefaults, client::ClientArguments},
    progress::Progress,
};
use nessus_walker::source::{HttpOptions, HttpSource, Source};

/// List the reports held by the server.
#[derive(clap::Args, Debug)]
pub struct List {
    #[command(flatten)]
    client: ClientArguments,

    #[command(flatten)]
    server: ServerArguments,

    #[command(flatten)]
    auth: AuthArguments,
}

impl CommandDefaults for List {
    fn progress(&self) -> bool {
        false
    }
}

impl List {
    pub async fn run<P: Progress + Clone>(self, progress: P) -> anyhow::Result<()> {
        let session = new_session(&self.server, self.auth, self.client).await?;
        let source = HttpSource::new(session, HttpOptions::default());

        let reports = source
            .load_reports()
            .await
            .context("Failed to get report list")?;

        progress.println(&format!("Number of reports found: {}", reports.len()));
        for (index, report) in reports.iter().enumerate() {
            progress.println(&format!(
                "[{index}] Name: {} | GUID: {} | Status: {}",
                report.readable_name, report.name, report.status
            ));
        }

        Ok(())
    }
}
