//! URL parsing for the HTTP client (simplified RFC 3986).

use std::fmt;

/// A parsed absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    /// Lowercased scheme (`http` or `https` for anything the client sends).
    pub scheme: String,
    pub host: String,
    /// Explicit port, if the URL carried one.
    pub port: Option<u16>,
    /// Path starting with `/`.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
}

impl Url {
    /// Parse `scheme://host[:port][/path][?query][#fragment]`.
    ///
    /// The fragment is dropped since it never goes on the wire.
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        let idx = url.find("://")?;
        let scheme = url[..idx].to_ascii_lowercase();
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+') {
            return None;
        }
        let rest = &url[idx + 3..];

        let rest = match rest.find('#') {
            Some(i) => &rest[..i],
            None => rest,
        };
        let (rest, query) = match rest.find('?') {
            Some(i) => (&rest[..i], Some(rest[i + 1..].to_string())),
            None => (rest, None),
        };
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        // Drop userinfo.
        let authority = authority.rsplit('@').next().unwrap_or(authority);

        let (host, port) = match authority.rfind(':') {
            Some(i) if !authority.ends_with(']') => {
                let port = authority[i + 1..].parse::<u16>().ok()?;
                (&authority[..i], Some(port))
            },
            _ => (authority, None),
        };
        if host.is_empty() {
            return None;
        }

        Some(Url {
            scheme,
            host: host.to_ascii_lowercase(),
            port,
            path: path.to_string(),
            query,
        })
    }

    /// Parse user input that may omit the scheme (`example.com/x`), assuming
    /// `default_scheme`.
    pub fn parse_lenient(input: &str, default_scheme: &str) -> Option<Self> {
        if input.contains("://") {
            Self::parse(input)
        } else {
            Self::parse(&format!("{default_scheme}://{}", input.trim()))
        }
    }

    /// Port to connect to: explicit, or the scheme default.
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(if self.is_https() { 443 } else { 80 })
    }

    pub fn is_https(&self) -> bool {
        self.scheme == "https"
    }

    /// Request target: path plus query.
    pub fn target(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Value for the `Host` header (port only when non-default).
    pub fn host_header(&self) -> String {
        let default = if self.is_https() { 443 } else { 80 };
        match self.port {
            Some(p) if p != default => format!("{}:{p}", self.host),
            _ => self.host.clone(),
        }
    }

    /// Same URL with a different scheme and the default port for it.
    pub fn with_scheme(&self, scheme: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            port: None,
            ..self.clone()
        }
    }

    /// Resolve a redirect `Location` against this URL.
    pub fn join(&self, location: &str) -> Option<Self> {
        let location = location.trim();
        if location.contains("://") {
            return Self::parse(location);
        }
        if let Some(rest) = location.strip_prefix("//") {
            return Self::parse(&format!("{}://{rest}", self.scheme));
        }
        let (path, query) = match location.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (location, None),
        };
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            let base = match self.path.rfind('/') {
                Some(i) => &self.path[..=i],
                None => "/",
            };
            format!("{base}{path}")
        };
        Some(Self {
            path,
            query,
            ..self.clone()
        })
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(p) = self.port {
            write!(f, ":{p}")?;
        }
        write!(f, "{}", self.path)?;
        if let Some(q) = &self.query {
            write!(f, "?{q}")?;
        }
        Ok(())
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full() {
        let u = Url::parse("HTTPS://Example.com:8443/a/b?x=1#frag").unwrap();
        assert_eq!(u.scheme, "https");
        assert_eq!(u.host, "example.com");
        assert_eq!(u.port, Some(8443));
        assert_eq!(u.path, "/a/b");
        assert_eq!(u.query.as_deref(), Some("x=1"));
        assert_eq!(u.to_string(), "https://example.com:8443/a/b?x=1");
    }

    #[test]
    fn parse_defaults_path() {
        let u = Url::parse("http://example.com").unwrap();
        assert_eq!(u.path, "/");
        assert_eq!(u.port_or_default(), 80);
        assert_eq!(u.host_header(), "example.com");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Url::parse("not a url").is_none());
        assert!(Url::parse("http://").is_none());
        assert!(Url::parse("http://host:notaport/").is_none());
    }

    #[test]
    fn lenient_adds_scheme() {
        let u = Url::parse_lenient("google.com", "http").unwrap();
        assert_eq!(u.to_string(), "http://google.com/");
    }

    #[test]
    fn with_scheme_drops_port() {
        let u = Url::parse("http://h:8080/x").unwrap().with_scheme("https");
        assert_eq!(u.to_string(), "https://h/x");
        assert_eq!(u.port_or_default(), 443);
    }

    #[test]
    fn join_locations() {
        let base = Url::parse("http://h/dir/page?q=1").unwrap();
        assert_eq!(base.join("/abs").unwrap().to_string(), "http://h/abs");
        assert_eq!(base.join("rel?z=2").unwrap().to_string(), "http://h/dir/rel?z=2");
        assert_eq!(
            base.join("https://other/").unwrap().to_string(),
            "https://other/"
        );
        assert_eq!(base.join("//cdn/x").unwrap().to_string(), "http://cdn/x");
    }

    #[test]
    fn percent_encoding() {
        assert_eq!(
            percent_encode("https://a.b/c?d=e f"),
            "https%3A%2F%2Fa.b%2Fc%3Fd%3De%20f"
        );
        assert_eq!(percent_encode("safe-_.~"), "safe-_.~");
    }
}
