//! Networking for deskterm: a small blocking HTTP/1.1 client used by the
//! `ping` and `curl` commands.
//!
//! HTTPS is available with the `tls-rustls` feature.

pub mod http;
#[cfg(feature = "tls-rustls")]
mod tls;
pub mod url;

pub use http::{DEFAULT_TIMEOUT, HttpClient, HttpRequest, HttpResponse, StdHttpClient};
pub use url::{Url, percent_encode};
