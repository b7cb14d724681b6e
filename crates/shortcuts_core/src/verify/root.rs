//! Redirect resolution and URL list normalization.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

static URL_DELIMITER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\s]+").expect("valid url delimiter regex"));

/// Status codes treated as redirect-class when they carry a `Location`.
const REDIRECT_STATUSES: &[u16] = &[301, 302, 303, 307, 308];

/// Why a URL candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// Candidate does not parse as an absolute URL.
    Invalid { url: String, reason: String },
    /// Transport failure (DNS, connect, TLS, timeout).
    Unreachable { url: String, reason: String },
    /// Redirect chain longer than the configured hop limit.
    TooManyRedirects { url: String, limit: u32 },
}

impl UrlError {
    /// Short machine-readable reason used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "invalid",
            Self::Unreachable { .. } => "unreachable",
            Self::TooManyRedirects { .. } => "too_many_redirects",
        }
    }
}

impl Display for UrlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { url, reason } => write!(f, "{url} is invalid: {reason}"),
            Self::Unreachable { url, reason } => write!(f, "{url} is unreachable: {reason}"),
            Self::TooManyRedirects { url, limit } => {
                write!(f, "{url} exceeded {limit} redirects")
            }
        }
    }
}

impl Error for UrlError {}

/// One HTTP response in a redirect chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub status: u16,
    pub location: Option<String>,
}

impl Hop {
    pub fn is_redirect(&self) -> bool {
        self.location.is_some() && REDIRECT_STATUSES.contains(&self.status)
    }

    fn redirect_target(&self, base: &Url) -> Option<Url> {
        if !self.is_redirect() {
            return None;
        }
        self.location
            .as_deref()
            .and_then(|location| base.join(location).ok())
    }
}

/// Performs a single GET without following redirects.
pub trait HopFetcher {
    fn fetch(&self, url: &Url) -> Result<Hop, UrlError>;
}

/// Verifies one URL candidate and returns its canonical form.
pub trait UrlVerifier: Send + Sync {
    fn verify_root(&self, candidate: &str) -> Result<String, UrlError>;
}

/// Prefixes `http://` unless the candidate already starts with `http`.
pub fn with_scheme(candidate: &str) -> String {
    if candidate.starts_with("http") {
        candidate.to_string()
    } else {
        format!("http://{candidate}")
    }
}

/// Resolves `candidate` by walking its redirect chain through `fetcher`.
///
/// - No redirect: returns the scheme-prefixed candidate unchanged.
/// - Redirect chain: returns the final target. Only redirect-class hops are
///   followed, so a non-empty chain always starts with one.
pub fn resolve_root<F: HopFetcher + ?Sized>(
    fetcher: &F,
    candidate: &str,
    max_redirects: u32,
) -> Result<String, UrlError> {
    let prefixed = with_scheme(candidate);
    let mut current = Url::parse(&prefixed).map_err(|err| UrlError::Invalid {
        url: prefixed.clone(),
        reason: err.to_string(),
    })?;

    let mut redirects: u32 = 0;
    loop {
        let hop = fetcher.fetch(&current)?;
        let Some(next) = hop.redirect_target(&current) else {
            break;
        };
        if redirects >= max_redirects {
            return Err(UrlError::TooManyRedirects {
                url: prefixed,
                limit: max_redirects,
            });
        }
        redirects += 1;
        current = next;
    }

    if redirects == 0 {
        Ok(prefixed)
    } else {
        Ok(current.to_string())
    }
}

/// Verifier that applies the scheme prefix and a syntax check, with no
/// network I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineUrlVerifier;

impl UrlVerifier for OfflineUrlVerifier {
    fn verify_root(&self, candidate: &str) -> Result<String, UrlError> {
        let prefixed = with_scheme(candidate);
        Url::parse(&prefixed).map_err(|err| UrlError::Invalid {
            url: prefixed.clone(),
            reason: err.to_string(),
        })?;
        Ok(prefixed)
    }
}

/// URL input accepted when creating or editing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlInput {
    /// Stored verbatim.
    List(Vec<String>),
    /// Comma/space-delimited text; every entry is verified.
    Delimited(String),
}

impl Default for UrlInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<Vec<String>> for UrlInput {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<String> for UrlInput {
    fn from(value: String) -> Self {
        Self::Delimited(value)
    }
}

impl From<&str> for UrlInput {
    fn from(value: &str) -> Self {
        Self::Delimited(value.to_string())
    }
}

impl From<Option<String>> for UrlInput {
    fn from(value: Option<String>) -> Self {
        value.map(Self::Delimited).unwrap_or_default()
    }
}

/// Turns `input` into the stored URL list.
pub fn normalize_urls<V: UrlVerifier + ?Sized>(verifier: &V, input: &UrlInput) -> Vec<String> {
    let text = match input {
        UrlInput::List(urls) => return urls.clone(),
        UrlInput::Delimited(text) => text,
    };

    let mut normalized = Vec::new();
    for (index, candidate) in URL_DELIMITER_RE
        .split(text.trim())
        .filter(|candidate| !candidate.is_empty())
        .enumerate()
    {
        match verifier.verify_root(candidate) {
            Ok(url) => normalized.push(url),
            Err(err) => warn!(
                "event=url_verify module=verify status=dropped index={} reason={}",
                index,
                err.code()
            ),
        }
    }
    debug!(
        "event=url_normalize module=verify status=ok kept={}",
        normalized.len()
    );
    normalized
}
