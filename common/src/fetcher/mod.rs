//! Fetching remote resources

mod data;
use backon::{ExponentialBuilder, Retryable};
pub use data::*;

use reqwest::{Client, ClientBuilder, IntoUrl, Method};
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

/// Fetch data using HTTP.
///
/// This is some functionality sitting on top an HTTP client, allowing for additional options like
/// retries.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    retries: usize,
}

/// Error when retrieving
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),
}

/// Options for the [`Fetcher`]
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct FetcherOptions {
    pub timeout: Duration,
    pub retries: usize,
    pub accept_invalid_certificates: bool,
}

impl FetcherOptions {
    /// Create a new instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: impl Into<Duration>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Set the number of retries.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Skip TLS certificate verification.
    pub fn accept_invalid_certificates(mut self, accept: bool) -> Self {
        self.accept_invalid_certificates = accept;
        self
    }
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            retries: 0,
            accept_invalid_certificates: false,
        }
    }
}

impl From<Client> for Fetcher {
    fn from(client: Client) -> Self {
        Self::with_client(client, FetcherOptions::default())
    }
}

impl Fetcher {
    /// Create a new downloader from options
    pub async fn new(options: FetcherOptions) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certificates);

        Ok(Self::with_client(client.build()?, options))
    }

    /// Create a fetcher providing an existing client.
    pub fn with_client(client: Client, options: FetcherOptions) -> Self {
        Self {
            client,
            retries: options.retries,
        }
    }

    fn new_request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.client.request(method, url)
    }

    /// fetch data, using a GET request.
    pub async fn fetch<D: Data>(&self, url: impl IntoUrl) -> Result<D, Error> {
        log::debug!("Fetching: {}", url.as_str());
        self.fetch_processed(url, TypedProcessor::<D>::new()).await
    }

    /// fetch data, using a GET request, processing the response data.
    pub async fn fetch_processed<D: DataProcessor>(
        &self,
        url: impl IntoUrl,
        processor: D,
    ) -> Result<D::Type, Error> {
        // if the URL building fails, there is no need to re-try, abort now.
        let url = url.into_url().map_err(Error::Request)?;

        self.execute(move || self.new_request(Method::GET, url.clone()), &processor)
            .await
    }

    /// submit a form, using a POST request.
    pub async fn submit<D: Data>(
        &self,
        url: impl IntoUrl,
        form: &[(&str, &str)],
    ) -> Result<D, Error> {
        log::debug!("Submitting: {}", url.as_str());
        self.submit_processed(url, form, TypedProcessor::<D>::new())
            .await
    }

    /// submit a form, using a POST request, processing the response data.
    pub async fn submit_processed<D: DataProcessor>(
        &self,
        url: impl IntoUrl,
        form: &[(&str, &str)],
        processor: D,
    ) -> Result<D::Type, Error> {
        let url = url.into_url().map_err(Error::Request)?;

        self.execute(
            move || self.new_request(Method::POST, url.clone()).form(form),
            &processor,
        )
        .await
    }

    async fn execute<F, D>(&self, request: F, processor: &D) -> Result<D::Type, Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
        D: DataProcessor,
    {
        let retries = self.retries;
        let backoff = ExponentialBuilder::default();

        (|| async {
            match self.execute_once(request(), processor).await {
                Ok(result) => Ok(result),
                Err(err) => {
                    log::info!("Failed to retrieve: {err}");
                    Err(err)
                }
            }
        })
        .retry(&backoff.with_max_times(retries))
        .await
    }

    async fn execute_once<D: DataProcessor>(
        &self,
        request: reqwest::RequestBuilder,
        processor: &D,
    ) -> Result<D::Type, Error> {
        let response = request.send().await?;

        processor.process(response).await
    }
}

/// Processing data returned by a request.
pub trait DataProcessor {
    type Type: Sized;
    fn process(
        &self,
        response: reqwest::Response,
    ) -> impl Future<Output = Result<Self::Type, Error>>;
}

struct TypedProcessor<D: Data> {
    _marker: PhantomData<D>,
}

impl<D: Data> TypedProcessor<D> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData::<D>,
        }
    }
}

/// Extract response payload which implements [`Data`].
impl<D: Data> DataProcessor for TypedProcessor<D> {
    type Type = D;

    async fn process(&self, response: reqwest::Response) -> Result<Self::Type, Error> {
        D::from_response(response).await
    }
}
