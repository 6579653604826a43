//! Discovering

use crate::model::report::ReportDescriptor;
use crate::selection::Format;
use async_trait::async_trait;
use nessus_common::utils::Urlify;
use std::fmt::Debug;
use std::future::Future;
use url::Url;

/// One artifact selected for download: one report in one output format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredArtifact {
    /// The report this artifact renders.
    pub report: ReportDescriptor,
    /// The requested output format.
    pub format: Format,
    /// The fully constructed download URL.
    pub url: Url,
}

impl Urlify for DiscoveredArtifact {
    fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug)]
pub struct DiscoveredContext<'c> {
    /// All reports listed by the server, in document order.
    pub reports: &'c [ReportDescriptor],
}

/// Visiting discovered artifacts
#[async_trait(?Send)]
pub trait DiscoveredVisitor {
    type Error: std::fmt::Display + Debug;
    type Context;

    async fn visit_context(
        &self,
        context: &DiscoveredContext,
    ) -> Result<Self::Context, Self::Error>;

    async fn visit_artifact(
        &self,
        context: &Self::Context,
        artifact: DiscoveredArtifact,
    ) -> Result<(), Self::Error>;
}

#[async_trait(?Send)]
impl<F, E, Fut> DiscoveredVisitor for F
where
    F: Fn(DiscoveredArtifact) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display + Debug,
{
    type Error = E;
    type Context = ();

    async fn visit_context(
        &self,
        _context: &DiscoveredContext,
    ) -> Result<Self::Context, Self::Error> {
        Ok(())
    }

    async fn visit_artifact(
        &self,
        _ctx: &Self::Context,
        artifact: DiscoveredArtifact,
    ) -> Result<(), Self::Error> {
        self(artifact).await
    }
}
