//! URL verification ("verify root") and task URL normalization.
//!
//! # Responsibility
//! - Prefix a missing scheme and check the URL over HTTP.
//! - Canonicalize redirects to their final target.
//! - Split delimited URL input into the stored list form.
//!
//! # Invariants
//! - Normalization never fails; unusable candidates are dropped and logged.
//! - List input is stored verbatim without network I/O.

mod http;
mod root;

pub use http::HttpUrlVerifier;
pub use root::{
    normalize_urls, resolve_root, with_scheme, Hop, HopFetcher, OfflineUrlVerifier, UrlError,
    UrlInput, UrlVerifier,
};
