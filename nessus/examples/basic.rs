use nessus_common::fetcher::FetcherOptions;
use nessus_walker::{
    retrieve::{RetrievalError, RetrievedArtifact, RetrievingVisitor},
    selection::Selection,
    session::{Credentials, Session},
    source::{HttpOptions, HttpSource},
    walker::Walker,
};
use url::Url;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let url = Url::parse("https://localhost:8834/")?;
    let credentials = Credentials {
        username: "admin".into(),
        password: "admin".into(),
    };

    let session = Session::login(url, &credentials, FetcherOptions::default()).await?;
    let source = HttpSource::new(session, HttpOptions::default());

    let selection = Selection::parse("all", "0", "")?;

    let retriever = RetrievingVisitor::new(
        source.clone(),
        |result: Result<RetrievedArtifact, RetrievalError<HttpSource>>| async move {
            match result {
                Ok(artifact) => println!("Retrieved: {}", artifact.filename),
                Err(err) => println!("Failed: {err}"),
            }
            Ok::<_, anyhow::Error>(())
        },
    );

    Walker::new(source, selection).walk(retriever).await?;

    Ok(())
}
