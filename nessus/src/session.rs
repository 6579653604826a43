//! Server sessions

use nessus_common::fetcher::{self, Data, DataProcessor, Fetcher, FetcherOptions};
use reqwest::{
    ClientBuilder, Response,
    header::{self, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use url::Url;

/// The default port of the management interface.
pub const DEFAULT_PORT: u16 = 8834;

/// The sequence token the management API expects with login and list requests. A fixed
/// constant, not session specific.
pub const SEQUENCE_TOKEN: &str = "6969";

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.9; rv:25.0) Gecko/20100101 Firefox/25.0";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-us,en;q=0.5";
const ACCEPT_ENCODING: &str = "text/html;charset=UTF-8";
const CACHE_CONTROL: &str = "max-age=0";

/// Credentials for the login operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// An authenticated session with a scanner's management interface.
///
/// Created once by [`Session::login`], immutable afterwards, passed explicitly to every
/// request until the process ends.
#[derive(Clone, Debug)]
pub struct Session {
    url: Url,
    cookie: String,
    fetcher: Fetcher,
}

/// Error logging in
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Fetch error: {0}")]
    Fetcher(#[from] fetcher::Error),
    #[error("login response carried no session cookie")]
    MissingSessionCookie,
    #[error("session cookie is not a valid header value: {0}")]
    Cookie(#[from] InvalidHeaderValue),
    #[error("failed to build HTTP client: {0:#}")]
    Client(anyhow::Error),
}

/// Error using a session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Fetch error: {0}")]
    Fetcher(#[from] fetcher::Error),
}

/// Extracts the verbatim `Set-Cookie` value from the login response.
struct SessionCookie;

impl DataProcessor for SessionCookie {
    type Type = Option<String>;

    async fn process(&self, response: Response) -> Result<Self::Type, fetcher::Error> {
        let response = response.error_for_status()?;

        Ok(response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string))
    }
}

impl Session {
    /// Log into the management interface and build the session.
    ///
    /// Sends the login form, extracts the session cookie from the response, and builds the
    /// fixed header set (user agent, cookie, accept headers) that every subsequent request
    /// carries.
    pub async fn login(
        url: Url,
        credentials: &Credentials,
        options: FetcherOptions,
    ) -> Result<Self, LoginError> {
        // the scanner ships a self-signed certificate, verification stays off
        let options = options.accept_invalid_certificates(true);

        let login = Fetcher::new(options.clone())
            .await
            .map_err(LoginError::Client)?;

        let cookie = login
            .submit_processed(
                url.join("/login")?,
                &[
                    ("password", credentials.password.as_str()),
                    ("seq", SEQUENCE_TOKEN),
                    ("login", credentials.username.as_str()),
                ],
                SessionCookie,
            )
            .await?
            .ok_or(LoginError::MissingSessionCookie)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie)?);
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        headers.insert(
            header::ACCEPT_ENCODING,
            HeaderValue::from_static(ACCEPT_ENCODING),
        );
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL),
        );

        let client = ClientBuilder::new()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(true)
            .default_headers(headers)
            .build()
            .map_err(|err| LoginError::Client(err.into()))?;

        Ok(Self {
            url,
            cookie,
            fetcher: Fetcher::with_client(client, options),
        })
    }

    /// The base URL of the management interface.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The session cookie, verbatim as received from the login response.
    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Perform a GET request against a path (or absolute URL) of the management interface.
    pub async fn get<D: Data>(&self, path: &str) -> Result<D, Error> {
        Ok(self.fetcher.fetch(self.url.join(path)?).await?)
    }

    /// Perform a GET request, processing the response data.
    pub async fn get_processed<D: DataProcessor>(
        &self,
        path: &str,
        processor: D,
    ) -> Result<D::Type, Error> {
        Ok(self
            .fetcher
            .fetch_processed(self.url.join(path)?, processor)
            .await?)
    }

    /// Perform a form-encoded POST request against a path of the management interface.
    pub async fn post_form<D: Data>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<D, Error> {
        Ok(self.fetcher.submit(self.url.join(path)?, form).await?)
    }
}
