//! Fallback resolution for host connection settings.
//!
//! Every setting resolves through an ordered candidate list: explicit init
//! options first, then parameters injected by an embedding page, then
//! whatever the container window exposes, with a compiled-in default as the
//! floor. Candidates are gathered by the wasm layer (`lookup`); the
//! precedence rules live here where they can be tested natively.

use const_format::concatcp;

/// Fallback when no host can be discovered (a developer install of the MA
/// server on its default port).
pub const DEFAULT_LINK_URL: &str = "http://localhost:55601/MA";

/// Path of the graphics api script below a link URL.
pub const WEB_GRAPHICS_API_PATH: &str = "/sma/apis/webGraphics/webGraphicsApi.js";

pub const DEFAULT_API_URL: &str = concatcp!(DEFAULT_LINK_URL, WEB_GRAPHICS_API_PATH);
pub const DEFAULT_SERVICES_URL: &str = concatcp!(DEFAULT_LINK_URL, "/service");

/// First candidate that is present and non-empty.
fn first_set<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().filter_map(|c| *c).find(|v| !v.is_empty())
}

pub fn resolve_link_url(
    from_options: Option<&str>,
    from_params: Option<&str>,
    from_container: Option<&str>,
) -> String {
    first_set(&[from_options, from_params, from_container])
        .unwrap_or(DEFAULT_LINK_URL)
        .to_string()
}

pub fn resolve_services_url(
    from_options: Option<&str>,
    from_params: Option<&str>,
    from_container: Option<&str>,
) -> String {
    first_set(&[from_options, from_params, from_container])
        .unwrap_or(DEFAULT_SERVICES_URL)
        .to_string()
}

/// The api script URL prefers an explicit parameter, then derives from the
/// container's link URL, then falls back to the default host.
pub fn resolve_api_url(from_params: Option<&str>, container_link_url: Option<&str>) -> String {
    if let Some(url) = first_set(&[from_params]) {
        return url.to_string();
    }
    if let Some(link) = first_set(&[container_link_url]) {
        return format!("{link}{WEB_GRAPHICS_API_PATH}");
    }
    DEFAULT_API_URL.to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_options_win_over_everything() {
        assert_eq!(
            resolve_link_url(Some("http://a/MA"), Some("http://b/MA"), Some("http://c/MA")),
            "http://a/MA"
        );
    }

    #[test]
    fn test_empty_candidates_are_skipped() {
        assert_eq!(
            resolve_link_url(Some(""), None, Some("http://c/MA")),
            "http://c/MA"
        );
        assert_eq!(
            resolve_services_url(None, Some(""), Some("http://c/service")),
            "http://c/service"
        );
    }

    #[test]
    fn test_defaults_are_the_floor() {
        assert_eq!(resolve_link_url(None, None, None), DEFAULT_LINK_URL);
        assert_eq!(resolve_services_url(None, Some(""), None), DEFAULT_SERVICES_URL);
        assert_eq!(resolve_api_url(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn test_api_url_derives_from_the_container_link() {
        assert_eq!(
            resolve_api_url(None, Some("http://host/intouchWeb")),
            format!("http://host/intouchWeb{WEB_GRAPHICS_API_PATH}")
        );
        // An explicit parameter is used verbatim
        assert_eq!(
            resolve_api_url(Some("http://host/custom/api.js"), Some("http://host/intouchWeb")),
            "http://host/custom/api.js"
        );
    }
}
