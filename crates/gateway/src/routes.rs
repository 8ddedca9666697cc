//! Route classification and gateway configuration.

/// Gateway configuration: deployment version, route prefixes, and the
/// precache manifest.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Deployment version, part of every cache name (e.g. "v3").
    pub version: String,
    /// Path prefix of the journal API.
    pub api_prefix: String,
    /// URL of the app shell document.
    pub app_shell: String,
    /// URL of the dedicated offline fallback page.
    pub offline_page: String,
    /// Static assets cached at install time.
    pub precache: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            api_prefix: "/api/".to_string(),
            app_shell: "/index.html".to_string(),
            offline_page: "/offline.html".to_string(),
            precache: vec![
                "/index.html".to_string(),
                "/offline.html".to_string(),
                "/manifest.json".to_string(),
            ],
        }
    }
}

impl GatewayConfig {
    /// Cache holding the app shell and static assets for this version.
    pub fn static_cache_name(&self) -> String {
        format!("tradebook-static-{}", self.version)
    }

    /// Cache holding API responses for this version.
    pub fn api_cache_name(&self) -> String {
        format!("tradebook-api-{}", self.version)
    }

    /// The complete current cache set; anything else is stale.
    pub fn current_cache_names(&self) -> Vec<String> {
        vec![self.static_cache_name(), self.api_cache_name()]
    }
}

/// An intercepted request, reduced to what routing needs.
#[derive(Clone, Debug)]
pub struct GatewayRequest {
    pub method: String,
    pub url: String,
    /// True for top-level document loads.
    pub is_navigation: bool,
}

impl GatewayRequest {
    pub fn get(url: &str) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.to_string(),
            is_navigation: false,
        }
    }

    pub fn navigation(url: &str) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.to_string(),
            is_navigation: true,
        }
    }

    /// Path component of the URL (strips scheme and host when present).
    pub fn path(&self) -> &str {
        let without_scheme = match self.url.find("://") {
            Some(index) => &self.url[index + 3..],
            None => return self.url.as_str(),
        };
        match without_scheme.find('/') {
            Some(index) => &without_scheme[index..],
            None => "/",
        }
    }

    fn is_http(&self) -> bool {
        match self.url.find("://") {
            Some(index) => matches!(&self.url[..index], "http" | "https"),
            // Relative URLs are same-origin HTTP.
            None => true,
        }
    }
}

/// Caching strategy bucket for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Not ours to handle - forwarded untouched.
    Passthrough,
    /// API call: network-first.
    Api,
    /// Document load: cache-first against the app shell.
    Navigation,
    /// Static asset: stale-while-revalidate.
    StaticAsset,
}

/// Classify a request, evaluated in priority order.
pub fn classify(config: &GatewayConfig, request: &GatewayRequest) -> RouteClass {
    if request.method != "GET" || !request.is_http() {
        return RouteClass::Passthrough;
    }
    if request.path().starts_with(&config.api_prefix) {
        return RouteClass::Api;
    }
    if request.is_navigation {
        return RouteClass::Navigation;
    }
    RouteClass::StaticAsset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig::default()
    }

    #[test]
    fn test_non_get_passes_through() {
        let request = GatewayRequest {
            method: "POST".to_string(),
            url: "/api/trades".to_string(),
            is_navigation: false,
        };
        assert_eq!(classify(&config(), &request), RouteClass::Passthrough);
    }

    #[test]
    fn test_non_http_scheme_passes_through() {
        let request = GatewayRequest::get("chrome-extension://abcdef/page.js");
        assert_eq!(classify(&config(), &request), RouteClass::Passthrough);
    }

    #[test]
    fn test_api_prefix_wins_over_navigation() {
        let request = GatewayRequest {
            method: "GET".to_string(),
            url: "https://journal.example.com/api/trades?userId=u1".to_string(),
            is_navigation: true,
        };
        assert_eq!(classify(&config(), &request), RouteClass::Api);
    }

    #[test]
    fn test_navigation_and_static_buckets() {
        assert_eq!(
            classify(&config(), &GatewayRequest::navigation("/journal")),
            RouteClass::Navigation
        );
        assert_eq!(
            classify(&config(), &GatewayRequest::get("/assets/app.js")),
            RouteClass::StaticAsset
        );
    }

    #[test]
    fn test_path_extraction() {
        assert_eq!(
            GatewayRequest::get("https://journal.example.com/api/trades").path(),
            "/api/trades"
        );
        assert_eq!(GatewayRequest::get("/api/trades").path(), "/api/trades");
        assert_eq!(GatewayRequest::get("https://journal.example.com").path(), "/");
    }

    #[test]
    fn test_cache_names_follow_version() {
        let mut config = GatewayConfig::default();
        config.version = "v7".to_string();
        assert_eq!(
            config.current_cache_names(),
            vec!["tradebook-static-v7", "tradebook-api-v7"]
        );
    }
}
