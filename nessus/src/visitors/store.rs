use crate::retrieve::{
    RetrievalContext, RetrievalError, RetrievedArtifact, RetrievedVisitor,
};
use crate::source::Source;
use anyhow::Context;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::fs;

/// Stores all downloaded artifacts into a local directory.
#[non_exhaustive]
pub struct StoreVisitor {
    /// the output base
    pub base: PathBuf,

    /// whether to set the file modification timestamps
    pub no_timestamps: bool,
}

impl StoreVisitor {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            no_timestamps: false,
        }
    }

    pub fn no_timestamps(mut self, no_timestamps: bool) -> Self {
        self.no_timestamps = no_timestamps;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0:#}")]
    Io(anyhow::Error),
}

#[derive(thiserror::Error)]
pub enum StoreRetrievedError<S: Source> {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Retrieval(RetrievalError<S>),
}

// Manual `Debug` impl: `#[derive(Debug)]` would add an `S: Debug` bound, but the
// `Source` trait only guarantees `Source::Error: Debug`. Bounding on `S: Source`
// keeps this error usable as the `RetrievedVisitor::Error` type for any source.
impl<S: Source> std::fmt::Debug for StoreRetrievedError<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => f.debug_tuple("Store").field(err).finish(),
            Self::Retrieval(err) => f.debug_tuple("Retrieval").field(err).finish(),
        }
    }
}

impl<S: Source> From<RetrievalError<S>> for StoreRetrievedError<S> {
    fn from(err: RetrievalError<S>) -> Self {
        Self::Retrieval(err)
    }
}

impl<S: Source> RetrievedVisitor<S> for StoreVisitor {
    type Error = StoreRetrievedError<S>;
    type Context = ();

    async fn visit_context(
        &self,
        _context: &RetrievalContext<'_>,
    ) -> Result<Self::Context, Self::Error> {
        self.prepare_output().await?;
        Ok(())
    }

    async fn visit_artifact(
        &self,
        _context: &Self::Context,
        result: Result<RetrievedArtifact, RetrievalError<S>>,
    ) -> Result<(), Self::Error> {
        self.store(&result?).await?;
        Ok(())
    }
}

impl StoreVisitor {
    async fn prepare_output(&self) -> Result<(), StoreError> {
        log::debug!("Creating output directory: {}", self.base.display());

        fs::create_dir_all(&self.base)
            .await
            .with_context(|| {
                format!("Unable to create output directory: {}", self.base.display())
            })
            .map_err(StoreError::Io)
    }

    async fn store(&self, artifact: &RetrievedArtifact) -> Result<(), StoreError> {
        let file = self.base.join(&artifact.filename);

        log::info!("Storing: {}", file.display());

        fs::write(&file, &artifact.data)
            .await
            .with_context(|| format!("Failed to write artifact: {}", file.display()))
            .map_err(StoreError::Io)?;

        if !self.no_timestamps {
            // if the server reported a modification time, apply it to the file
            if let Some(modified) = artifact.metadata.last_modification {
                filetime::set_file_mtime(
                    &file,
                    filetime::FileTime::from_system_time(SystemTime::from(modified)),
                )
                .with_context(|| {
                    format!(
                        "Failed to set last modification timestamp: {}",
                        file.display()
                    )
                })
                .map_err(StoreError::Io)?;
            }
        }

        Ok(())
    }
}
