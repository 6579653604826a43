use crate::cmd::{AuthArguments, ServerArguments};
use anyhow::Context;
use nessus_common::cli::client::ClientArguments;
use nessus_walker::session::Session;

/// Log into the management interface with arguments from the command line, prompting for
/// missing credentials.
pub async fn new_session(
    server: &ServerArguments,
    auth: AuthArguments,
    client: ClientArguments,
) -> anyhow::Result<Session> {
    let url = server.url()?;
    let credentials = auth.credentials()?;

    log::info!("Logging into {url}");

    Session::login(url, &credentials, client.into())
        .await
        .context("Failed to log in")
}
