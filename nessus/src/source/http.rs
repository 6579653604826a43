use crate::discover::DiscoveredArtifact;
use crate::model::report::{ReportDescriptor, ReportListReply};
use crate::retrieve::RetrievedArtifact;
use crate::selection::Format;
use crate::session::{self, SEQUENCE_TOKEN, Session};
use crate::source::Source;
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use nessus_common::fetcher::{DataProcessor, Error as FetchError, Text, Xml};
use nessus_common::retrieve::RetrievalMetadata;
use reqwest::Response;
use scraper::{Html, Selector};
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;
use tokio::time::sleep;
use url::Url;

/// The page title the server serves while it is still rendering a report.
const FORMATTING_MARKER: &[u8] = b"<title>Formatting the report</title>";

/// Options for the [`HttpSource`]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpOptions {
    /// Wait before the first poll of a rendering report.
    pub initial_delay: Duration,
    /// Interval between polls while the report keeps rendering.
    pub poll_interval: Duration,
    /// Give up after this many polls of a report that keeps rendering.
    pub poll_limit: usize,
}

impl HttpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_delay(mut self, initial_delay: impl Into<Duration>) -> Self {
        self.initial_delay = initial_delay.into();
        self
    }

    pub fn poll_interval(mut self, poll_interval: impl Into<Duration>) -> Self {
        self.poll_interval = poll_interval.into();
        self
    }

    pub fn poll_limit(mut self, poll_limit: usize) -> Self {
        self.poll_limit = poll_limit;
        self
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            poll_interval: Duration::from_secs(2),
            poll_limit: 150,
        }
    }
}

/// A source fetching reports from a scanner's management interface.
#[derive(Clone, Debug)]
pub struct HttpSource {
    pub session: Session,
    pub options: HttpOptions,
}

impl HttpSource {
    pub fn new(session: Session, options: HttpOptions) -> Self {
        Self { session, options }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpSourceError {
    #[error("Session error: {0}")]
    Session(#[from] session::Error),
    #[error("rendered page carried no meta refresh redirect")]
    MissingRedirect,
    #[error("unable to derive a file name from redirect URL: {0}")]
    Filename(String),
    #[error("formatting timed out after {polls} polls")]
    FormattingTimeout { polls: usize },
}

#[async_trait(?Send)]
impl Source for HttpSource {
    type Error = HttpSourceError;

    fn url(&self) -> &Url {
        self.session.url()
    }

    async fn load_reports(&self) -> Result<Vec<ReportDescriptor>, Self::Error> {
        Ok(self
            .session
            .post_form::<Xml<ReportListReply>>("/report/list", &[("seq", SEQUENCE_TOKEN)])
            .await?
            .into_inner()
            .into_reports())
    }

    async fn load_artifact(
        &self,
        artifact: DiscoveredArtifact,
    ) -> Result<RetrievedArtifact, Self::Error> {
        match artifact.format {
            Format::Nessus => self.download_native(artifact).await,
            _ => self.download_rendered(artifact).await,
        }
    }
}

impl HttpSource {
    /// Native format: the response body is the final artifact, the file name comes from the
    /// report descriptor.
    async fn download_native(
        &self,
        artifact: DiscoveredArtifact,
    ) -> Result<RetrievedArtifact, HttpSourceError> {
        let fetched = self
            .session
            .get_processed(artifact.url.as_str(), FetchingRetrievedArtifact)
            .await?;

        let filename = format!(
            "{}-{}.nessus",
            artifact.report.readable_name.replace('/', "-"),
            artifact.report.timestamp
        );

        Ok(fetched.into_retrieved(artifact, filename))
    }

    /// Rendered formats: follow the meta refresh redirect, poll while the server is still
    /// formatting, fetch the `step=2` stage where the format requires it.
    async fn download_rendered(
        &self,
        artifact: DiscoveredArtifact,
    ) -> Result<RetrievedArtifact, HttpSourceError> {
        let page = self.session.get::<Text>(artifact.url.as_str()).await?;
        let redirect = extract_refresh_url(&page).ok_or(HttpSourceError::MissingRedirect)?;

        log::debug!("Redirected to: {redirect}");
        sleep(self.options.initial_delay).await;

        let mut polls = 0;
        let mut fetched = self
            .session
            .get_processed(&redirect, FetchingRetrievedArtifact)
            .await?;

        while is_formatting(&fetched.data) {
            polls += 1;
            if polls >= self.options.poll_limit {
                return Err(HttpSourceError::FormattingTimeout { polls });
            }

            sleep(self.options.poll_interval).await;
            fetched = self
                .session
                .get_processed(&redirect, FetchingRetrievedArtifact)
                .await?;
        }

        if artifact.format.has_second_step() {
            fetched = self
                .session
                .get_processed(&format!("{redirect}&step=2"), FetchingRetrievedArtifact)
                .await?;
        }

        let filename = filename_from_redirect(&redirect)
            .ok_or_else(|| HttpSourceError::Filename(redirect.clone()))?;

        Ok(fetched.into_retrieved(artifact, filename))
    }
}

pub struct FetchedRetrievedArtifact {
    data: Bytes,
    metadata: RetrievalMetadata,
}

impl FetchedRetrievedArtifact {
    fn into_retrieved(self, discovered: DiscoveredArtifact, filename: String) -> RetrievedArtifact {
        RetrievedArtifact {
            discovered,
            data: self.data,
            filename,
            metadata: self.metadata,
        }
    }
}

/// Collect a response body and its retrieval metadata.
pub struct FetchingRetrievedArtifact;

impl DataProcessor for FetchingRetrievedArtifact {
    type Type = FetchedRetrievedArtifact;

    async fn process(&self, response: Response) -> Result<Self::Type, FetchError> {
        let mut response = response.error_for_status()?;

        let mut data = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            data.put(chunk);
        }

        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|s| s.to_str().ok())
            .map(ToString::to_string);

        let last_modification = response
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|s| s.to_str().ok())
            .and_then(|s| OffsetDateTime::parse(s, &Rfc2822).ok());

        Ok(FetchedRetrievedArtifact {
            data: data.freeze(),
            metadata: RetrievalMetadata {
                last_modification,
                etag,
            },
        })
    }
}

/// Extract the redirect target of a `<meta http-equiv="refresh">` tag: the substring of its
/// `content` attribute following `url=`.
fn extract_refresh_url(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse(r#"meta[http-equiv="refresh"]"#).ok()?;
    let content = document.select(&selector).next()?.value().attr("content")?;

    content
        .split_once("url=")
        .map(|(_, url)| url.to_string())
}

/// The file name is the second token of the redirect URL split on `=`.
fn filename_from_redirect(redirect: &str) -> Option<String> {
    redirect.split('=').nth(1).map(ToString::to_string)
}

fn is_formatting(body: &[u8]) -> bool {
    body.windows(FORMATTING_MARKER.len())
        .any(|window| window == FORMATTING_MARKER)
}
