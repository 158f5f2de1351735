//! Which requests the worker answers and which responses it may keep.

/// Set all relative paths that can have their files cached on demand.
/// The paths are relative to the `/` part of the URL and compared as
/// substrings of the full request URL.
pub const CACHEABLE_PATH_PREFIXES: &[&str] = &["/apis/resources/"];

/// Whether a successfully fetched response may be stored for next time.
pub fn is_cacheable(url: &str) -> bool {
    CACHEABLE_PATH_PREFIXES.iter().any(|path| url.contains(path))
}

/// Only requests to the worker's own origin are intercepted at all;
/// everything else gets default browser handling.
pub fn is_same_origin(url: &str, origin: &str) -> bool {
    url.starts_with(origin)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resource_paths_are_cacheable() {
        assert!(is_cacheable("https://host/apis/resources/image.png"));
        assert!(is_cacheable("https://host/deep/apis/resources/fonts/a.woff2"));
    }

    #[test]
    fn test_other_paths_are_not_cacheable() {
        assert!(!is_cacheable("https://host/other/page.html"));
        assert!(!is_cacheable("https://host/apis/data/tags"));
        assert!(!is_cacheable("https://host/"));
    }

    #[test]
    fn test_same_origin_is_a_prefix_check_on_the_origin() {
        let origin = "https://host";
        assert!(is_same_origin("https://host/apis/resources/image.png", origin));
        assert!(!is_same_origin("https://external.example/lib.js", origin));
    }
}
