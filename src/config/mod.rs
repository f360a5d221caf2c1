use crate::cli::Args;
use crate::error::ConfigError;
use log::info;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded::byte_serialize;
use url::Url;

/// How the client reaches the scene service. Browser builds of the product
/// differed only in this; here it is plain configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsMode {
    Direct,
    /// Target URL is URL-encoded and appended to the proxy prefix.
    Proxy(String),
    /// Only the origin of the base URL is kept.
    SameOrigin,
}

impl fmt::Display for CorsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsMode::Direct => write!(f, "direct"),
            CorsMode::Proxy(prefix) => write!(f, "proxy ({})", prefix),
            CorsMode::SameOrigin => write!(f, "same-origin"),
        }
    }
}

impl CorsMode {
    pub fn parse(mode: &str, proxy: Option<&str>) -> Result<Self, ConfigError> {
        match mode.to_lowercase().as_str() {
            "direct" => Ok(CorsMode::Direct),
            "same-origin" | "same_origin" => Ok(CorsMode::SameOrigin),
            "proxy" => {
                let prefix = proxy
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or(ConfigError::MissingProxy)?;
                Ok(CorsMode::Proxy(prefix.to_string()))
            }
            other => Err(ConfigError::UnsupportedCorsMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub cors: CorsMode,
}

impl FromStr for ApiConfig {
    type Err = ConfigError;

    fn from_str(base_url: &str) -> Result<Self, Self::Err> {
        Self::new(base_url, CorsMode::Direct)
    }
}

impl ApiConfig {
    pub fn new(base_url: &str, cors: CorsMode) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|source| ConfigError::InvalidUrl {
            value: base_url.to_string(),
            source,
        })?;
        Ok(Self { base_url, cors })
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let cors = CorsMode::parse(&args.cors_mode, args.cors_proxy.as_deref())?;
        let config = Self::new(&args.api_base_url, cors)?;
        info!("Scene service: {} (CORS: {})", config.base_url, config.cors);
        Ok(config)
    }

    /// Full request URL for an API route such as `/api/health`.
    pub fn endpoint(&self, route: &str) -> String {
        match &self.cors {
            CorsMode::Direct => self.direct_url(route),
            CorsMode::SameOrigin => {
                format!("{}{}", self.base_url.origin().ascii_serialization(), route)
            }
            CorsMode::Proxy(prefix) => {
                let target: String = byte_serialize(self.direct_url(route).as_bytes()).collect();
                format!("{}{}", prefix, target)
            }
        }
    }

    fn direct_url(&self, route: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), route)
    }
}

/// Encodes a value for use as a single path segment. Form encoding turns
/// spaces into '+', which is literal in a path.
pub fn path_segment(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect::<String>().replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_endpoint_keeps_base_path() {
        let config = ApiConfig::new("http://scenes.local:9000/v1/", CorsMode::Direct).unwrap();
        assert_eq!(config.endpoint("/api/health"), "http://scenes.local:9000/v1/api/health");
    }

    #[test]
    fn same_origin_drops_base_path() {
        let config = ApiConfig::new("https://scenes.local/app/", CorsMode::SameOrigin).unwrap();
        assert_eq!(config.endpoint("/api/health"), "https://scenes.local/api/health");
    }

    #[test]
    fn proxy_encodes_target() {
        let cors = CorsMode::parse("proxy", Some("https://corsproxy.io/?")).unwrap();
        let config = ApiConfig::new("http://127.0.0.1:1", cors).unwrap();
        assert_eq!(
            config.endpoint("/api/generate-scene"),
            "https://corsproxy.io/?http%3A%2F%2F127.0.0.1%3A1%2Fapi%2Fgenerate-scene"
        );
    }

    #[test]
    fn proxy_without_prefix_is_rejected() {
        assert!(matches!(CorsMode::parse("proxy", Some("  ")), Err(ConfigError::MissingProxy)));
        assert!(matches!(
            CorsMode::parse("jsonp", None),
            Err(ConfigError::UnsupportedCorsMode(_))
        ));
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(matches!("not a url".parse::<ApiConfig>(), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn path_segment_escapes_separators_and_spaces() {
        assert_eq!(path_segment("a/b c+d"), "a%2Fb%20c%2Bd");
    }
}
