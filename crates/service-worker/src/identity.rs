//! Widget identity and cache namespace naming.
//!
//! Every widget+version pair owns exactly one cache namespace, named
//! `<widgetName>-v<N>`. The widget name comes from the worker's own
//! deployment path, so two widgets deployed side by side never share (or
//! evict) each other's caches.

/// Version tag baked into the cache namespace name. Bumping it makes the
/// next install start a fresh namespace and activation evict the old one.
pub const CACHE_VERSION: u32 = 1;

/// The widget this worker instance belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetIdentity {
    name: String,
}

impl WidgetIdentity {
    /// Derives the widget name from the worker script's deployment path.
    ///
    /// The worker is served from `<...>/<widgetName>/sw.js`, so the name is
    /// the second-to-last path segment. Paths without one (a worker served
    /// from the site root) yield `None` and the caller fails install rather
    /// than running with an empty namespace.
    pub fn from_worker_path(pathname: &str) -> Option<Self> {
        let name = pathname.rsplit('/').nth(1)?;
        if name.is_empty() {
            return None;
        }
        Some(Self { name: name.to_string() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the cache namespace owned by this widget at the current
    /// version.
    pub fn cache_name(&self) -> String {
        format!("{}-v{}", self.name, CACHE_VERSION)
    }

    /// Assets fetched and stored before the worker is allowed to activate:
    /// the widget's index document and its `<widgetName>.wjson` data
    /// document, plus any extra assets injected at build time through the
    /// `WIDGET_EXTRA_ASSETS` environment variable (comma separated,
    /// relative to the worker scope).
    pub fn precache_urls(&self) -> Vec<String> {
        let mut urls = vec![
            "./index.html".to_string(),
            format!("./{}.wjson", self.name),
        ];

        if let Some(extra) = option_env!("WIDGET_EXTRA_ASSETS") {
            urls.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        }

        urls
    }

    /// True for a namespace this widget owns at a version other than the
    /// current one. Names that don't parse are never considered stale, so
    /// eviction leaves them alone.
    pub fn is_stale_namespace(&self, cache_name: &str) -> bool {
        match parse_cache_name(cache_name) {
            Some(parsed) => parsed.widget == self.name && parsed.version != CACHE_VERSION,
            None => false,
        }
    }
}

/// A cache namespace name split back into its widget and version parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCacheName {
    pub widget: String,
    pub version: u32,
}

/// Parses `<widgetName>-v<integer>`, splitting on the last `-v` so widget
/// names that themselves contain `-v` still round-trip. Anything else
/// (other widgets' schemes, third party caches) returns `None`.
pub fn parse_cache_name(name: &str) -> Option<ParsedCacheName> {
    let (widget, version) = name.rsplit_once("-v")?;
    if widget.is_empty() || version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(ParsedCacheName {
        widget: widget.to_string(),
        version: version.parse().ok()?,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_widget_name_is_second_to_last_path_segment() {
        let identity = WidgetIdentity::from_worker_path("/Widgets/carousel/sw.js").unwrap();
        assert_eq!(identity.name(), "carousel");

        let identity = WidgetIdentity::from_worker_path("/a/b/gauge/sw.js").unwrap();
        assert_eq!(identity.name(), "gauge");
    }

    #[test]
    fn test_widget_name_requires_a_parent_segment() {
        assert_eq!(WidgetIdentity::from_worker_path("/sw.js"), None);
        assert_eq!(WidgetIdentity::from_worker_path("sw.js"), None);
        assert_eq!(WidgetIdentity::from_worker_path(""), None);
    }

    #[test]
    fn test_cache_name_round_trips_through_parse() {
        let identity = WidgetIdentity::from_worker_path("/Widgets/carousel/sw.js").unwrap();
        let parsed = parse_cache_name(&identity.cache_name()).unwrap();

        assert_eq!(parsed.widget, "carousel");
        assert_eq!(parsed.version, CACHE_VERSION);
    }

    #[test]
    fn test_parse_cache_name_accepts_the_expected_shape() {
        assert_eq!(
            parse_cache_name("carousel-v3"),
            Some(ParsedCacheName { widget: "carousel".to_string(), version: 3 })
        );
        // The version split is on the last -v
        assert_eq!(
            parse_cache_name("my-video-v12"),
            Some(ParsedCacheName { widget: "my-video".to_string(), version: 12 })
        );
    }

    #[test]
    fn test_parse_cache_name_rejects_malformed_names() {
        assert_eq!(parse_cache_name("carousel"), None);
        assert_eq!(parse_cache_name("carousel-v"), None);
        assert_eq!(parse_cache_name("carousel-vNaN"), None);
        assert_eq!(parse_cache_name("carousel-v1.5"), None);
        assert_eq!(parse_cache_name("-v1"), None);
        assert_eq!(parse_cache_name(""), None);
    }

    #[test]
    fn test_eviction_targets_own_stale_versions_only() {
        let identity = WidgetIdentity::from_worker_path("/Widgets/carousel/sw.js").unwrap();

        // Prior versions of this widget are stale
        assert!(identity.is_stale_namespace("carousel-v2"));
        assert!(identity.is_stale_namespace("carousel-v99"));

        // The current version, other widgets and unparseable names are not
        assert!(!identity.is_stale_namespace(&identity.cache_name()));
        assert!(!identity.is_stale_namespace("gauge-v2"));
        assert!(!identity.is_stale_namespace("some-other-cache"));
    }

    #[test]
    fn test_precache_manifest_contains_index_and_data_document() {
        let identity = WidgetIdentity::from_worker_path("/Widgets/carousel/sw.js").unwrap();
        let urls = identity.precache_urls();

        assert!(urls.contains(&"./index.html".to_string()));
        assert!(urls.contains(&"./carousel.wjson".to_string()));
    }
}
