//! Defines a connection to gitlab
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};

use crate::config::Config;
use crate::error::BoxedError;

/// Infos needed to connect to gitlab
#[derive(Clone, Debug)]
pub struct Connection {
    /// Gitlab root URL
    pub base_url: Url,
    /// [`reqwest`] client, it sends the authentication headers with every request
    pub http_client: Client,
}

impl Connection {
    /// Creates a new [`Connection`]
    pub fn new(config: &Config) -> Result<Self, BoxedError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.access_token))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http_client,
        })
    }

    /// Builds `<base_url>/api/v4/<segments>`
    ///
    /// Each segment is percent-encoded, so a `/` inside a segment becomes `%2F`
    pub fn endpoint<I>(&self, segments: I) -> Result<Url, BoxedError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        // `https://host/` and `https://host/prefix/` end with an empty segment
        // that would otherwise give `//api/v4`. `https://host/prefix` has none
        // and must keep `prefix`, so only an empty last segment is removed.
        url.path_segments_mut()
            .map_err(|()| format!("{} can't be used as a base URL", self.base_url))?
            .pop_if_empty()
            .extend(["api", "v4"])
            .extend(segments);
        Ok(url)
    }
}
