use crate::error::{EmbedError, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Body and declared content type of a successful GET.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// One blocking GET per call. No retries, no caching.
pub trait Transport {
    fn get(&self, url: &str) -> Result<Response>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(EmbedError::HttpClient)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response> {
        debug!(url, "GET");
        let network = |source: reqwest::Error| EmbedError::Network {
            url: url.to_string(),
            source,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(network)?;

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = resp.bytes().map_err(network)?.to_vec();
        debug!(url, bytes = body.len(), content_type = %content_type, "response");

        Ok(Response { body, content_type })
    }
}
