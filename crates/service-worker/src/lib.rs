use console_error_panic_hook::set_once as set_panic_hook;
use gloo::net::http::Method;
use shared::utils::{
    fetch::simple_request,
    tracing::configure_tracing_once as configure_tracing,
};
use tracing::{debug, error, info};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{
    js_sys::{Array, Promise},
    Cache, CacheStorage, FetchEvent, Request, Response, ServiceWorkerGlobalScope,
};

mod identity;
mod policy;

pub use identity::{parse_cache_name, ParsedCacheName, WidgetIdentity, CACHE_VERSION};
pub use policy::{is_cacheable, is_same_origin, CACHEABLE_PATH_PREFIXES};

async fn get_cache(caches: &CacheStorage, name: &str) -> Result<Cache, JsValue> {
    let cache: Cache = JsFuture::from(caches.open(name)).await?.into();
    Ok(cache)
}

fn widget_identity(sw: &ServiceWorkerGlobalScope) -> Result<WidgetIdentity, JsValue> {
    let pathname = sw.location().pathname();
    WidgetIdentity::from_worker_path(&pathname).ok_or_else(|| {
        let message = format!("cannot derive a widget name from worker path {pathname:?}");
        error!("{message}");
        JsValue::from(message)
    })
}

async fn install(sw: ServiceWorkerGlobalScope) -> Result<JsValue, JsValue> {
    let identity = widget_identity(&sw)?;
    let cache_name = identity.cache_name();
    let cache = get_cache(&sw.caches()?, &cache_name).await?;

    for url in identity.precache_urls() {
        // Every manifest entry has to land. A partial precache is never
        // signalled as ready, the platform discards this version instead and
        // keeps whatever was active before.
        let response = match simple_request(Method::GET, &url).await {
            Ok(response) => response,
            Err(e) => {
                error!("precache fetch {url}: {e}");
                return Err(e.into());
            }
        };

        let response: Response = response.into();
        JsFuture::from(cache.put_with_str(&url, &response)).await?;
        debug!("precached {url}");
    }

    // Take over from any previous version as soon as activation runs rather
    // than waiting for its clients to close.
    // MDN states the promise returned can be safely ignored
    let _ = sw.skip_waiting()?;

    info!("install complete for {cache_name}");
    Ok(JsValue::undefined())
}

#[wasm_bindgen]
pub fn worker_install(sw: ServiceWorkerGlobalScope) -> Promise {
    set_panic_hook();
    configure_tracing();

    future_to_promise(install(sw))
}

async fn activate(sw: ServiceWorkerGlobalScope) -> Result<JsValue, JsValue> {
    let identity = widget_identity(&sw)?;
    let caches = sw.caches()?;

    // Evict this widget's namespaces from other versions. Namespaces that
    // belong to other widgets, or that don't parse at all, stay untouched.
    let names: Array = JsFuture::from(caches.keys()).await?.into();
    let deletions = Array::new();
    for name in names.iter().filter_map(|name| name.as_string()) {
        if identity.is_stale_namespace(&name) {
            debug!("evicting stale cache {name}");
            deletions.push(&caches.delete(&name));
        }
    }

    // One bulk operation; a failing delete doesn't stop the others running
    JsFuture::from(Promise::all(&deletions)).await?;

    // Claim open clients so they switch to this worker without a reload
    JsFuture::from(sw.clients().claim()).await?;

    info!("activated {}", identity.cache_name());
    Ok(JsValue::undefined())
}

#[wasm_bindgen]
pub fn worker_activate(sw: ServiceWorkerGlobalScope) -> Promise {
    set_panic_hook();
    configure_tracing();

    future_to_promise(activate(sw))
}

async fn fetch(sw: ServiceWorkerGlobalScope, request: Request) -> Result<JsValue, JsValue> {
    let identity = widget_identity(&sw)?;
    let cache = get_cache(&sw.caches()?, &identity.cache_name()).await?;

    let url = request.url();

    // Check this widget's namespace first
    let cached = JsFuture::from(cache.match_with_request(&request)).await?;
    if cached.is_instance_of::<Response>() {
        debug!("HIT: {url}");
        return Ok(cached);
    }
    debug!("MISS: {url}");

    let fetched = JsFuture::from(sw.fetch_with_request(&request)).await?;
    if !fetched.is_instance_of::<Response>() {
        let message = format!("fetch returned something other than a Response: {fetched:?}");
        error!("{message}");
        return Err(JsValue::from(message));
    }
    let response: Response = fetched.into();

    if policy::is_cacheable(&url) {
        // Response bodies are single-use streams; store a copy and hand the
        // original back to the page
        let copy = response.clone()?;
        JsFuture::from(cache.put_with_request(&request, &copy)).await?;
        debug!("cached {url}");
    }

    Ok(JsValue::from(&response))
}

#[wasm_bindgen]
pub fn worker_fetch(sw: ServiceWorkerGlobalScope, event: FetchEvent) -> Result<(), JsValue> {
    set_panic_hook();
    configure_tracing();

    let request = event.request();

    // Cross-origin requests pass through to default browser handling; the
    // cache is never queried or written for them
    if !policy::is_same_origin(&request.url(), &sw.origin()) {
        return Ok(());
    }

    let response = future_to_promise(fetch(sw, request));
    event.respond_with(&response)?;
    Ok(())
}
