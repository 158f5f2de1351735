//! Bootstrap bridge between a custom widget and the MA host application.
//!
//! The host serves a graphics api script whose location depends on how the
//! widget is embedded (directly, inside another widget, or inside an
//! embedded browser). The bridge resolves the script and service URLs
//! through fallback chains, authenticates with whatever session info the
//! host exposes, loads the script, and wires up the show/hide lifecycle
//! callbacks the host uses for caching.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use console_error_panic_hook::set_once as set_panic_hook;
use gloo::{
    timers::{callback::Timeout, future::TimeoutFuture},
    utils::format::JsValueSerdeExt,
};
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use shared::{error::JsError, utils::tracing::configure_tracing_once as configure_tracing};
use tracing::{debug, error, info};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlScriptElement;

mod lookup;
mod resolve;
mod session;

pub use resolve::{
    resolve_api_url, resolve_link_url, resolve_services_url, DEFAULT_API_URL, DEFAULT_LINK_URL,
    DEFAULT_SERVICES_URL, WEB_GRAPHICS_API_PATH,
};
pub use session::{resolve_logon, LogonUserInfo, GUEST_USER};

/// How long to wait before re-trying a failed graphics api script load.
/// Failures usually mean the host server hasn't finished starting.
const API_RETRY_MS: u32 = 500;

/// How often to poll for the widget proxy the host wires up asynchronously.
const PROXY_POLL_MS: u32 = 50;

/// Id of the host viewer widget in the container page.
const VIEWER_ID: &str = "_x_viewer_Viewer";

/// The options object handed to `webGraphicsApi.init`. The success/failure
/// callbacks are attached after serialization since functions don't
/// serialize.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiOptions {
    link_url: String,
    service_url: String,
    user: String,
    password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    screen_belong_viewer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_cache: Option<bool>,
}

struct BridgeState {
    opts: RefCell<ApiOptions>,
    success: RefCell<Option<Function>>,
    failure: RefCell<Option<Function>>,
    registered_show_hide: Cell<bool>,
    hidden: Cell<bool>,
    viewer: RefCell<Option<JsValue>>,
}

#[wasm_bindgen]
pub struct MaSvrHelper {
    state: Rc<BridgeState>,
}

#[wasm_bindgen]
impl MaSvrHelper {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MaSvrHelper {
        set_panic_hook();
        configure_tracing();

        MaSvrHelper {
            state: Rc::new(BridgeState {
                opts: RefCell::new(ApiOptions::default()),
                success: RefCell::new(None),
                failure: RefCell::new(None),
                registered_show_hide: Cell::new(false),
                hidden: Cell::new(false),
                viewer: RefCell::new(None),
            }),
        }
    }

    /// Resolves connection settings and session info, then loads the
    /// graphics api script. `on_api_loaded` fires after the script lands
    /// and before `webGraphicsApi.init` is called.
    pub fn init(&self, opts: JsValue, on_api_loaded: Option<Function>) {
        let success = function_at(&opts, "success");
        let failure = function_at(&opts, "failure");

        let link_url = resolve_link_url(
            lookup::string_at(&opts, &["linkUrl"]).as_deref(),
            params_string("linkUrl").as_deref(),
            container_link_url().as_deref(),
        );
        let service_url = resolve_services_url(
            lookup::string_at(&opts, &["serviceUrl"]).as_deref(),
            params_string("servicesUrl").as_deref(),
            container_services_url().as_deref(),
        );

        let (user, password, token) = match lookup::string_at(&opts, &["user"]) {
            Some(user) => (
                user,
                lookup::string_at(&opts, &["password"]).unwrap_or_default(),
                lookup::string_at(&opts, &["token"]),
            ),
            None => {
                let info = resolve_logon(
                    LogonUserInfo::default(),
                    host_session_info(),
                    parent_logon_info(),
                );
                (
                    info.user_or_guest().to_string(),
                    info.password.clone().unwrap_or_default(),
                    info.token,
                )
            }
        };

        *self.state.opts.borrow_mut() = ApiOptions {
            link_url,
            service_url,
            user,
            password,
            token,
            screen_belong_viewer: lookup::get_in(&opts, &["screenBelongViewer"])
                .and_then(|v| v.as_bool())
                .unwrap_or(true),
            enable_cache: lookup::get_in(&opts, &["enableCache"]).and_then(|v| v.as_bool()),
        };
        *self.state.success.borrow_mut() = success;
        *self.state.failure.borrow_mut() = failure;

        spawn_local(load_graphics_api(self.state.clone(), on_api_loaded));
    }

    /// Registers show/hide handlers with the widget proxy for caching
    /// support. The internal handlers drive the host viewer's screen
    /// show/hide; the optional callbacks run in addition. Registration is
    /// idempotent.
    #[wasm_bindgen(js_name = regOnShowHideHandler)]
    pub fn reg_on_show_hide_handler(
        &self,
        on_show: Option<Function>,
        on_hide: Option<Function>,
        on_rendering_done: Option<Function>,
    ) {
        if self.state.registered_show_hide.get() {
            return;
        }
        register_show_hide(self.state.clone(), on_show, on_hide, on_rendering_done);
    }

    /// The session credentials this bridge would sign in with: explicit
    /// init options first, then whatever the host session exposes.
    #[wasm_bindgen(js_name = getLogonUserInfo)]
    pub fn get_logon_user_info(&self) -> JsValue {
        let info = {
            let opts = self.state.opts.borrow();
            if opts.user.is_empty() {
                resolve_logon(LogonUserInfo::default(), host_session_info(), parent_logon_info())
            } else {
                LogonUserInfo {
                    user: Some(opts.user.clone()),
                    password: Some(opts.password.clone()),
                    token: opts.token.clone(),
                }
            }
        };

        <JsValue as JsValueSerdeExt>::from_serde(&info).unwrap_or(JsValue::NULL)
    }
}

impl Default for MaSvrHelper {
    fn default() -> Self {
        Self::new()
    }
}

fn window_value() -> JsValue {
    JsValue::from(gloo::utils::window())
}

fn function_at(root: &JsValue, key: &str) -> Option<Function> {
    lookup::get_in(root, &[key]).and_then(|f| f.dyn_into::<Function>().ok())
}

/// Parameters an embedding page can inject before the widget loads.
fn params_string(key: &str) -> Option<String> {
    lookup::string_at(&window_value(), &["SmaCustomWidget", "MASvrHelperParams", key])
}

/// The container window the host's core component exposes through the
/// widget proxy.
fn host_window() -> Option<JsValue> {
    lookup::get_in(&window_value(), &["SmaCustomWidget", "proxy", "host", "win"])
}

fn is_self_window(win: &JsValue) -> bool {
    Object::is(win, &window_value())
}

/// Calls a method on the container window's own bridge, for containers
/// that are themselves custom widgets.
fn call_bridge_string(win: &JsValue, method: &str) -> Option<String> {
    let bridge = lookup::get_in(win, &["SmaCustomWidget", "MASvrHelper"])?;
    let f = lookup::get_in(&bridge, &[method])?.dyn_into::<Function>().ok()?;
    lookup::non_empty_string(f.call0(&bridge).ok()?)
}

fn bridge_has_method(win: &JsValue, method: &str) -> bool {
    lookup::get_in(win, &["SmaCustomWidget", "MASvrHelper", method])
        .is_some_and(|f| f.is_function())
}

/// Link URL advertised by the container window: the loaded graphics api
/// first, then a parent bridge, then the dojo config of the host page.
fn container_link_url() -> Option<String> {
    let win = host_window()?;

    if let Some(url) = lookup::string_at(&win, &["webGraphicsApi", "_link_url"]) {
        return Some(url);
    }

    if !is_self_window(&win) && bridge_has_method(&win, "_getLinkUrlFromContainerApi") {
        return call_bridge_string(&win, "_getLinkUrlFromContainerApi");
    }

    lookup::string_at(&win, &["dojoConfig", "baseUrl"])
}

/// Services URL advertised by the container window.
fn container_services_url() -> Option<String> {
    let win = host_window()?;

    let direct = if lookup::get_in(&win, &["webGraphicsApi"]).is_some() {
        lookup::string_at(&win, &["webGraphicsApi", "service_url"])
    } else {
        lookup::string_at(&win, &["sma", "configSettings", "servicesUrl"])
    };
    if direct.is_some() {
        return direct;
    }

    if !is_self_window(&win) {
        return call_bridge_string(&win, "_getServicesUrl");
    }

    None
}

/// Session info the host's core component leaves on the container window.
fn host_session_info() -> Option<LogonUserInfo> {
    let win = host_window()?;

    let user = lookup::string_at(&win, &["sma", "temp", "userName"]);
    let token = lookup::string_at(&win, &["sma", "temp", "token"]);
    if user.is_some() || token.is_some() {
        return Some(LogonUserInfo { user, password: None, token });
    }

    let user = lookup::string_at(&win, &["webGraphicsApi", "_userName"])?;
    Some(LogonUserInfo { user: Some(user), password: None, token: None })
}

/// Session info from a parent bridge in the container window.
fn parent_logon_info() -> Option<LogonUserInfo> {
    let win = host_window()?;
    if is_self_window(&win) {
        return None;
    }

    let bridge = lookup::get_in(&win, &["SmaCustomWidget", "MASvrHelper"])?;
    let f = lookup::get_in(&bridge, &["getLogonUserInfo"])?.dyn_into::<Function>().ok()?;
    let record = f.call0(&bridge).ok()?;

    Some(LogonUserInfo {
        user: lookup::string_at(&record, &["user"]),
        password: lookup::string_at(&record, &["password"]),
        token: lookup::string_at(&record, &["token"]),
    })
}

/// Loads the graphics api script, retrying until the host serves it. The
/// host server starting up after the widget page is a normal condition.
async fn load_graphics_api(state: Rc<BridgeState>, on_api_loaded: Option<Function>) {
    loop {
        // Re-resolved every attempt; an embedded browser can set the
        // parameters while we wait
        let api_url = resolve_api_url(
            params_string("apiUrl").as_deref(),
            container_link_url().as_deref(),
        );

        match inject_script(&api_url).await {
            Ok(script) => {
                let api = lookup::get_in(&window_value(), &["webGraphicsApi"]);
                match api {
                    Some(api) if api.is_object() => {
                        info!("graphics api loaded from {api_url}");
                        if let Some(cb) = on_api_loaded.as_ref() {
                            let _ = cb.call0(&JsValue::NULL);
                        }
                        state.refresh_urls();
                        state.call_api_init(&api);
                        return;
                    }
                    _ => {
                        // Loaded but didn't define the api; treat it like a
                        // failed load
                        if let Some(parent) = script.parent_node() {
                            let _ = parent.remove_child(&script);
                        }
                        debug!("{api_url} loaded without defining webGraphicsApi");
                    }
                }
            }
            Err(e) => {
                debug!("graphics api not ready: {}", JsError::from(e));
            }
        }

        TimeoutFuture::new(API_RETRY_MS).await;
    }
}

/// Appends a script tag and resolves once it loads. A failed load removes
/// the tag again so retries don't pile up dead nodes.
async fn inject_script(src: &str) -> Result<HtmlScriptElement, JsValue> {
    let document = gloo::utils::document();
    let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(src);

    let body = gloo::utils::body();
    body.append_child(&script)?;

    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });

    match JsFuture::from(loaded).await {
        Ok(_) => Ok(script),
        Err(e) => {
            let _ = body.remove_child(&script);
            Err(e)
        }
    }
}

impl BridgeState {
    /// The embedding page may have provided URLs while the script was
    /// loading; pick them up when init had to fall back to the defaults.
    fn refresh_urls(&self) {
        let mut opts = self.opts.borrow_mut();
        if opts.link_url == DEFAULT_LINK_URL {
            opts.link_url = resolve_link_url(
                None,
                params_string("linkUrl").as_deref(),
                container_link_url().as_deref(),
            );
        }
        if opts.service_url == DEFAULT_SERVICES_URL {
            opts.service_url = resolve_services_url(
                None,
                params_string("servicesUrl").as_deref(),
                container_services_url().as_deref(),
            );
        }
    }

    fn call_api_init(&self, api: &JsValue) {
        let value = {
            let opts = self.opts.borrow();
            match <JsValue as JsValueSerdeExt>::from_serde(&*opts) {
                Ok(value) => value,
                Err(e) => {
                    error!("serializing api options: {e}");
                    return;
                }
            }
        };

        if let Some(success) = self.success.borrow().as_ref() {
            let _ = Reflect::set(&value, &JsValue::from_str("success"), success.as_ref());
        }
        if let Some(failure) = self.failure.borrow().as_ref() {
            let _ = Reflect::set(&value, &JsValue::from_str("failure"), failure.as_ref());
        }

        match function_at(api, "init") {
            Some(init) => {
                if let Err(e) = init.call1(api, &value) {
                    error!("webGraphicsApi.init failed: {}", JsError::from(e));
                }
            }
            None => error!("webGraphicsApi has no init function"),
        }
    }
}

/// The host viewer widget, looked up lazily and cached.
fn viewer(state: &BridgeState) -> Option<JsValue> {
    if let Some(v) = state.viewer.borrow().as_ref() {
        return Some(v.clone());
    }

    let dijit = lookup::get_in(&window_value(), &["dijit"])?;
    let by_id = lookup::get_in(&dijit, &["byId"])?.dyn_into::<Function>().ok()?;
    let v = by_id.call1(&dijit, &JsValue::from_str(VIEWER_ID)).ok()?;
    if v.is_null() || v.is_undefined() {
        return None;
    }

    *state.viewer.borrow_mut() = Some(v.clone());
    Some(v)
}

fn call_viewer_method(viewer: &JsValue, name: &str, arg: Option<&JsValue>) {
    let Some(f) = function_at(viewer, name) else {
        return;
    };
    let result = match arg {
        Some(arg) => f.call1(viewer, arg),
        None => f.call0(viewer),
    };
    if let Err(e) = result {
        error!("viewer.{name}: {}", JsError::from(e));
    }
}

fn register_proxy_callback(proxy: &JsValue, name: &str, callback: &JsValue) {
    match function_at(proxy, name) {
        Some(f) => {
            if let Err(e) = f.call1(proxy, callback) {
                error!("proxy.{name}: {}", JsError::from(e));
            }
        }
        None => error!("widget proxy has no {name}"),
    }
}

fn register_show_hide(
    state: Rc<BridgeState>,
    on_show_cb: Option<Function>,
    on_hide_cb: Option<Function>,
    on_rendering_done: Option<Function>,
) {
    if state.registered_show_hide.get() {
        return;
    }

    let proxy = match lookup::get_in(&window_value(), &["cwidget", "_proxy"]) {
        Some(proxy) => proxy,
        None => {
            // The host wires the proxy up asynchronously; poll until it
            // lands
            let state = state.clone();
            Timeout::new(PROXY_POLL_MS, move || {
                register_show_hide(state, on_show_cb, on_hide_cb, on_rendering_done)
            })
            .forget();
            return;
        }
    };

    state.registered_show_hide.set(true);

    let show_state = state.clone();
    let on_show = Closure::<dyn FnMut()>::new(move || {
        // Only a real return from hidden re-shows the screens
        if !show_state.hidden.get() {
            return;
        }

        match viewer(&show_state) {
            Some(v) => {
                let rendering_done = on_rendering_done
                    .as_ref()
                    .map(|f| JsValue::from(f.clone()))
                    .unwrap_or(JsValue::UNDEFINED);
                let user_cb = on_show_cb.clone();
                let raf = Closure::once_into_js(move || {
                    call_viewer_method(&v, "_showAllHiddenScreens", Some(&rendering_done));
                    if let Some(cb) = user_cb {
                        let _ = cb.call0(&JsValue::NULL);
                    }
                });
                let _ = gloo::utils::window().request_animation_frame(raf.unchecked_ref());
            }
            None => {
                if let Some(cb) = on_show_cb.as_ref() {
                    let _ = cb.call0(&JsValue::NULL);
                }
            }
        }
    });

    let hide_state = state.clone();
    let on_hide = Closure::<dyn FnMut()>::new(move || {
        hide_state.hidden.set(true);
        if let Some(v) = viewer(&hide_state) {
            call_viewer_method(&v, "_hideAllScreens", None);
        }
        if let Some(cb) = on_hide_cb.as_ref() {
            let _ = cb.call0(&JsValue::NULL);
        }
    });

    register_proxy_callback(&proxy, "addOnShow", on_show.as_ref());
    register_proxy_callback(&proxy, "addOnHide", on_hide.as_ref());

    // The handlers live for the lifetime of the page
    on_show.forget();
    on_hide.forget();
}
