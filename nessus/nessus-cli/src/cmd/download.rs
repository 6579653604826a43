use crate::{
    cmd::{AuthArguments, PollArguments, SelectionArguments, ServerArguments, StoreArguments},
    common::new_session,
};
use anyhow::Context;
use nessus_common::{
    cli::{CommandDefaults, client::ClientArguments},
    progress::Progress,
};
use nessus_walker::{
    retrieve::RetrievingVisitor,
    source::{HttpSource, Source},
    walker::Walker,
};

/// Download a selection of reports from the server.
#[derive(clap::Args, Debug)]
pub struct Download {
    #[command(flatten)]
    client: ClientArguments,

    #[command(flatten)]
    server: ServerArguments,

    #[command(flatten)]
    auth: AuthArguments,

    #[command(flatten)]
    selection: SelectionArguments,

    #[command(flatten)]
    poll: PollArguments,

    #[command(flatten)]
    store: StoreArguments,
}

impl CommandDefaults for Download {}

impl Download {
    pub async fn run<P: Progress + Clone>(self, progress: P) -> anyhow::Result<()> {
        let session = new_session(&self.server, self.auth, self.client).await?;
        let source = HttpSource::new(session, self.poll.into());

        log::info!("Getting report list");
        let reports = source
            .load_reports()
            .await
            .context("Failed to get report list")?;

        let selection = self.selection.into_selection(&reports)?;
        let store = self.store.into_visitor()?;

        Walker::new(source.clone(), selection)
            .with_reports(reports)
            .with_progress(progress.clone())
            .walk(RetrievingVisitor::new(source, store))
            .await
            .context("Failed to download reports")?;

        progress.println("Report download completed");

        Ok(())
    }
}
