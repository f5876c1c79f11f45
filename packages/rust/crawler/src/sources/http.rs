//! Plain HTTP page source.
//!
//! Returns the HTML exactly as served. Works when the records browser renders
//! its navigation server-side, which the static help center does.

use std::time::Duration;

use nsrecords_shared::{NsRecordsError, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::PageSource;

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("nsrecords/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow per page.
const MAX_REDIRECTS: usize = 5;

/// Fetches pages with a shared `reqwest` client.
pub struct HttpPageSource {
    client: Client,
    current: Option<String>,
}

impl HttpPageSource {
    /// Create a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()
            .map_err(|e| NsRecordsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            current: None,
        })
    }
}

impl PageSource for HttpPageSource {
    async fn goto(&mut self, url: &Url) -> Result<()> {
        self.current = None;
        debug!(%url, "GET");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| NsRecordsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NsRecordsError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NsRecordsError::Network(format!("{url}: body read failed: {e}")))?;

        self.current = Some(body);
        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| NsRecordsError::Network("no page loaded".into()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_page_body() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/record/x.html"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<h1>X</h1>"))
            .mount(&server)
            .await;

        let mut source = HttpPageSource::new(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&format!("{}/record/x.html", server.uri())).unwrap();
        source.goto(&url).await.unwrap();
        assert_eq!(source.content().await.unwrap(), "<h1>X</h1>");
    }

    #[tokio::test]
    async fn http_error_clears_current_page() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/ok.html"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::path("/missing.html"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut source = HttpPageSource::new(Duration::from_secs(5)).unwrap();
        source
            .goto(&Url::parse(&format!("{}/ok.html", server.uri())).unwrap())
            .await
            .unwrap();

        let err = source
            .goto(&Url::parse(&format!("{}/missing.html", server.uri())).unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
        assert!(source.content().await.is_err());
    }
}
