//! Backend endpoint settings.

/// Connection settings for one backend instance.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Base URL including scheme, without port.
    pub base_url: String,
    pub port: u16,
    /// Auth key supplied by the caller; token lifecycle is not managed here.
    pub api_key: String,
}

impl Endpoint {
    pub fn new(host: &str, port: u16, api_key: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(host),
            port,
            api_key: api_key.into(),
        }
    }

    /// Full URL for a resource path on this endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}:{}/{}", self.base_url, self.port, path)
    }
}

/// Default the scheme to HTTPS when the supplied host carries none.
///
/// Matches the vendor tooling convention: any host string containing an
/// `http` substring is taken as already carrying a scheme.
pub fn normalize_base_url(host: &str) -> String {
    if host.contains("http") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
