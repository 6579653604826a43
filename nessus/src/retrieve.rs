//! Retrieval

use crate::{
    discover::{DiscoveredArtifact, DiscoveredContext, DiscoveredVisitor},
    source::Source,
};
use bytes::Bytes;
use nessus_common::{retrieve::RetrievalMetadata, utils::Urlify};
use std::{
    fmt::Debug,
    future::Future,
    ops::{Deref, DerefMut},
};
use url::Url;

/// A retrieved artifact: the discovered artifact plus its downloaded body.
#[derive(Clone, Debug)]
pub struct RetrievedArtifact {
    /// The discovered artifact
    pub discovered: DiscoveredArtifact,

    /// The artifact data
    pub data: Bytes,

    /// The local file name derived during the download
    pub filename: String,

    /// Metadata from the retrieval process
    pub metadata: RetrievalMetadata,
}

impl Urlify for RetrievedArtifact {
    fn url(&self) -> &Url {
        &self.discovered.url
    }
}

impl Deref for RetrievedArtifact {
    type Target = DiscoveredArtifact;

    fn deref(&self) -> &Self::Target {
        &self.discovered
    }
}

impl DerefMut for RetrievedArtifact {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.discovered
    }
}

#[derive(thiserror::Error)]
pub enum RetrievalError<S: Source> {
    #[error("source error: {err}")]
    Source {
        err: S::Error,
        discovered: DiscoveredArtifact,
    },
}

// Manual `Debug` impl: `#[derive(Debug)]` would add an `S: Debug` bound, but the
// `Source` trait only guarantees `Source::Error: Debug`. Bounding on `S: Source`
// keeps this error usable as a visitor `Error` type for any source.
impl<S: Source> Debug for RetrievalError<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source { err, discovered } => f
                .debug_struct("Source")
                .field("err", err)
                .field("discovered", discovered)
                .finish(),
        }
    }
}

impl<S: Source> RetrievalError<S> {
    pub fn discovered(&self) -> &DiscoveredArtifact {
        match self {
            Self::Source { discovered, .. } => discovered,
        }
    }
}

impl<S: Source> Urlify for RetrievalError<S> {
    fn url(&self) -> &Url {
        &self.discovered().url
    }
}

pub struct RetrievalContext<'c> {
    pub discovered: &'c DiscoveredContext<'c>,
}

impl<'c> Deref for RetrievalContext<'c> {
    type Target = DiscoveredContext<'c>;

    fn deref(&self) -> &Self::Target {
        self.discovered
    }
}

pub trait RetrievedVisitor<S: Source> {
    type Error: std::fmt::Display + Debug;
    type Context;

    fn visit_context(
        &self,
        context: &RetrievalContext,
    ) -> impl Future<Output = Result<Self::Context, Self::Error>>;

    fn visit_artifact(
        &self,
        context: &Self::Context,
        result: Result<RetrievedArtifact, RetrievalError<S>>,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

impl<F, E, Fut, S> RetrievedVisitor<S> for F
where
    F: Fn(Result<RetrievedArtifact, RetrievalError<S>>) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display + Debug,
    S: Source,
{
    type Error = E;
    type Context = ();

    async fn visit_context(
        &self,
        _context: &RetrievalContext<'_>,
    ) -> Result<Self::Context, Self::Error> {
        Ok(())
    }

    async fn visit_artifact(
        &self,
        _ctx: &Self::Context,
        outcome: Result<RetrievedArtifact, RetrievalError<S>>,
    ) -> Result<(), Self::Error> {
        self(outcome).await
    }
}

/// A visitor retrieving every discovered artifact from its source, forwarding the outcome.
pub struct RetrievingVisitor<V: RetrievedVisitor<S>, S: Source> {
    visitor: V,
    source: S,
}

impl<V, S> RetrievingVisitor<V, S>
where
    V: RetrievedVisitor<S>,
    S: Source,
{
    pub fn new(source: S, visitor: V) -> Self {
        Self { visitor, source }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error<VE>
where
    VE: std::fmt::Display + Debug,
{
    #[error(transparent)]
    Visitor(VE),
}

#[async_trait::async_trait(?Send)]
impl<V, S> DiscoveredVisitor for RetrievingVisitor<V, S>
where
    V: RetrievedVisitor<S>,
    S: Source,
{
    type Error = Error<V::Error>;
    type Context = V::Context;

    async fn visit_context(
        &self,
        context: &DiscoveredContext,
    ) -> Result<Self::Context, Self::Error> {
        self.visitor
            .visit_context(&RetrievalContext {
                discovered: context,
            })
            .await
            .map_err(Error::Visitor)
    }

    async fn visit_artifact(
        &self,
        context: &Self::Context,
        discovered: DiscoveredArtifact,
    ) -> Result<(), Self::Error> {
        let artifact = self
            .source
            .load_artifact(discovered.clone())
            .await
            .map_err(|err| RetrievalError::Source { err, discovered });

        self.visitor
            .visit_artifact(context, artifact)
            .await
            .map_err(Error::Visitor)?;

        Ok(())
    }
}
