//! The actual walker

use crate::discover::{DiscoveredContext, DiscoveredVisitor};
use crate::model::report::ReportDescriptor;
use crate::selection::{Selection, SelectionError};
use crate::source::Source;
use nessus_common::progress::{Progress, ProgressBar};
use std::fmt::Debug;

#[derive(Debug, thiserror::Error)]
pub enum Error<VE, SE>
where
    VE: std::fmt::Display + Debug,
    SE: std::fmt::Display + Debug,
{
    #[error("Source error: {0}")]
    Source(SE),
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),
    #[error("Visitor error: {0}")]
    Visitor(VE),
}

/// Walks every artifact of a selection, one at a time, in selection order.
pub struct Walker<S: Source, P: Progress = ()> {
    source: S,
    selection: Selection,
    progress: P,
    reports: Option<Vec<ReportDescriptor>>,
}

impl<S: Source> Walker<S, ()> {
    pub fn new(source: S, selection: Selection) -> Self {
        Self {
            source,
            selection,
            progress: (),
            reports: None,
        }
    }
}

impl<S: Source, P: Progress> Walker<S, P> {
    pub fn with_progress<P2: Progress>(self, progress: P2) -> Walker<S, P2> {
        Walker {
            source: self.source,
            selection: self.selection,
            progress,
            reports: self.reports,
        }
    }

    /// Provide an already listed report sequence, instead of listing again while walking.
    pub fn with_reports(mut self, reports: Vec<ReportDescriptor>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub async fn walk<V>(self, visitor: V) -> Result<(), Error<V::Error, S::Error>>
    where
        V: DiscoveredVisitor,
    {
        let reports = match self.reports {
            Some(reports) => reports,
            None => self.source.load_reports().await.map_err(Error::Source)?,
        };

        let context = visitor
            .visit_context(&DiscoveredContext { reports: &reports })
            .await
            .map_err(Error::Visitor)?;

        let artifacts = self.selection.artifacts(&reports, self.source.url())?;

        let mut progress = self.progress.start(artifacts.len());

        for artifact in artifacts {
            log::debug!("Discovered artifact: {}", artifact.url);
            progress
                .set_message(format!(
                    "{} ({})",
                    artifact.report.readable_name, artifact.format
                ))
                .await;

            visitor
                .visit_artifact(&context, artifact)
                .await
                .map_err(Error::Visitor)?;
            progress.tick().await;
        }

        progress.finish().await;

        Ok(())
    }
}
