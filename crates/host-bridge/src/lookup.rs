//! Reflect walks over the host page's global objects.
//!
//! The host exposes its state as ad-hoc nested globals
//! (`window.SmaCustomWidget.*`, `window.sma.*`, ...). None of them are
//! guaranteed to exist at any given moment, so every lookup degrades to
//! `None` instead of throwing.

use js_sys::Reflect;
use wasm_bindgen::JsValue;

/// Walks a property path, stopping at the first missing or non-object hop.
pub fn get_in(root: &JsValue, path: &[&str]) -> Option<JsValue> {
    let mut current = root.clone();
    for key in path {
        if !current.is_object() && !current.is_function() {
            return None;
        }
        current = Reflect::get(&current, &JsValue::from_str(key)).ok()?;
        if current.is_null() || current.is_undefined() {
            return None;
        }
    }
    Some(current)
}

/// A string property that is present and non-empty.
pub fn string_at(root: &JsValue, path: &[&str]) -> Option<String> {
    get_in(root, path).and_then(non_empty_string)
}

pub fn non_empty_string(value: JsValue) -> Option<String> {
    value.as_string().filter(|s| !s.is_empty())
}
