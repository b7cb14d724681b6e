//! `ureq`-backed URL verifier.

use super::root::{resolve_root, Hop, HopFetcher, UrlError, UrlVerifier};
use crate::config::VerifierConfig;
use log::debug;
use url::Url;

/// Verifies URLs with blocking HTTP GET requests.
///
/// Redirects are followed manually so the chain can be inspected.
pub struct HttpUrlVerifier {
    agent: ureq::Agent,
    max_redirects: u32,
}

impl HttpUrlVerifier {
    pub fn new(config: &VerifierConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .redirects(0)
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            max_redirects: config.max_redirects,
        }
    }
}

impl Default for HttpUrlVerifier {
    fn default() -> Self {
        Self::new(&VerifierConfig::default())
    }
}

impl HopFetcher for HttpUrlVerifier {
    fn fetch(&self, url: &Url) -> Result<Hop, UrlError> {
        let response = match self.agent.get(url.as_str()).call() {
            Ok(response) => response,
            // 4xx/5xx still count as an answer from the host.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(UrlError::Unreachable {
                    url: url.to_string(),
                    reason: transport.to_string(),
                });
            }
        };

        let hop = Hop {
            status: response.status(),
            location: response.header("location").map(str::to_string),
        };
        debug!(
            "event=url_hop module=verify status={} redirect={}",
            hop.status,
            hop.is_redirect()
        );
        Ok(hop)
    }
}

impl UrlVerifier for HttpUrlVerifier {
    fn verify_root(&self, candidate: &str) -> Result<String, UrlError> {
        resolve_root(self, candidate, self.max_redirects)
    }
}
