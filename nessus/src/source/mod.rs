//! Sources

mod http;

pub use http::*;

use crate::{
    discover::DiscoveredArtifact, model::report::ReportDescriptor, retrieve::RetrievedArtifact,
};
use async_trait::async_trait;
use std::fmt::{Debug, Display};
use url::Url;

/// A source of scan reports
#[async_trait(?Send)]
pub trait Source: Clone {
    type Error: Display + Debug;

    /// The base URL download paths are resolved against.
    fn url(&self) -> &Url;

    /// List the reports held by the source, in document order.
    async fn load_reports(&self) -> Result<Vec<ReportDescriptor>, Self::Error>;

    /// Download one artifact, following the source's formatting protocol.
    async fn load_artifact(
        &self,
        artifact: DiscoveredArtifact,
    ) -> Result<RetrievedArtifact, Self::Error>;
}
