//! Media source: opens a stream URL as an async byte stream.

use crate::config::HttpConfig;
use crate::error::{DownloadError, Error, Result};
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use std::pin::Pin;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

/// An opened media resource
pub struct MediaStream {
    /// Declared size of the body, if the server sent one
    pub content_length: Option<u64>,
    /// The body, read incrementally
    pub body: Pin<Box<dyn AsyncRead + Send>>,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Abstraction over fetching a media URL, enabling testability.
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// Start fetching `url`
    ///
    /// Fails if the request cannot be sent or the response status is not a success.
    async fn open(&self, url: &str) -> Result<MediaStream>;
}

/// Production [`MediaSource`] backed by a reqwest client.
///
/// Every request carries the configured `User-Agent` and `Referer`, which the
/// platform's CDN requires, and the whole transfer is bounded by the configured
/// timeout.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Build an HTTP source from the HTTP section of the configuration
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::config("http.user_agent", e.to_string()))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer)
                .map_err(|e| Error::config("http.referer", e.to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl MediaSource for HttpSource {
    async fn open(&self, url: &str) -> Result<MediaStream> {
        let parsed = url::Url::parse(url).map_err(|e| DownloadError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let content_length = response.content_length();
        let stream = response.bytes_stream().map_err(std::io::Error::other);

        Ok(MediaStream {
            content_length,
            body: Box::pin(StreamReader::new(stream)),
        })
    }
}
