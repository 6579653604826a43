//! Walking through Nessus scan reports
//!
//! ## Idea
//!
//! The basic idea is to log into a scanner's management interface once, list the reports it
//! holds, and then walk over every artifact the operator selected (one report in one output
//! format), chaining visitors in a layered fashion depending on your use case. The last step,
//! most likely, is to do something with a retrieved artifact (like storing it). For the common
//! command line use case, the `nessus-cli` crate has out-of-the-box tooling.
//!
//! ## Example
//!
//! A simple example for downloading every report in the native format:
//!
//! ```no_run
//! use anyhow::Result;
//! use url::Url;
//! use nessus_common::fetcher::FetcherOptions;
//! use nessus_walker::retrieve::RetrievingVisitor;
//! use nessus_walker::selection::Selection;
//! use nessus_walker::session::{Credentials, Session};
//! use nessus_walker::source::{HttpOptions, HttpSource};
//! use nessus_walker::visitors::store::StoreVisitor;
//! use nessus_walker::walker::Walker;
//!
//! async fn download() -> Result<()> {
//!     let url = Url::parse("https://scanner.example.com:8834/")?;
//!     let credentials = Credentials {
//!         username: "admin".into(),
//!         password: "secret".into(),
//!     };
//!     let session = Session::login(url, &credentials, FetcherOptions::default()).await?;
//!     let source = HttpSource::new(session, HttpOptions::default());
//!
//!     let selection = Selection::parse("all", "0", "")?;
//!
//!     Walker::new(source.clone(), selection)
//!         .walk(RetrievingVisitor::new(
//!             source,
//!             StoreVisitor::new("reports"),
//!         ))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod discover;
pub mod model;
pub mod retrieve;
pub mod selection;
pub mod session;
pub mod source;
pub mod visitors;
pub mod walker;
