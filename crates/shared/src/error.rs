use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{
    Error as GenericJsError,
    RangeError as JsRangeError,
    ReferenceError as JsReferenceError,
    SyntaxError as JsSyntaxError,
    TypeError as JsTypeError,
    UriError as JsUriError,
};

/// A thrown JS value sorted into the standard error classes so it can be
/// logged and matched on from Rust.
#[derive(Debug, Clone, Error)]
pub enum JsError {
    #[error("GenericJs Error: {0:?}")]
    GenericJs(GenericJsError),
    #[error("JsRange Error: {0:?}")]
    JsRange(JsRangeError),
    #[error("JsReference Error: {0:?}")]
    JsReference(JsReferenceError),
    #[error("JsSyntax Error: {0:?}")]
    JsSyntax(JsSyntaxError),
    #[error("JsType Error: {0:?}")]
    JsType(JsTypeError),
    #[error("JsUri Error: {0:?}")]
    JsUri(JsUriError),
    #[error("UnknownJsValue Error: {0:?}")]
    UnknownJsValue(String),
}

impl From<JsValue> for JsError {
    fn from(err: JsValue) -> JsError {
        if err.is_instance_of::<JsRangeError>() {
            return JsError::JsRange(err.into());
        }
        if err.is_instance_of::<JsReferenceError>() {
            return JsError::JsReference(err.into());
        }
        if err.is_instance_of::<JsSyntaxError>() {
            return JsError::JsSyntax(err.into());
        }
        if err.is_instance_of::<JsTypeError>() {
            return JsError::JsType(err.into());
        }
        if err.is_instance_of::<JsUriError>() {
            return JsError::JsUri(err.into());
        }
        if err.is_instance_of::<GenericJsError>() {
            return JsError::GenericJs(err.into());
        }
        JsError::UnknownJsValue(format!("{:?}", err))
    }
}

/// Error raised while fetching a resource on behalf of a widget.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Net(#[from] gloo::net::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error(transparent)]
    Js(#[from] JsError),
    #[error("{context}: {inner}")]
    WithContext {
        context: String,
        inner: Box<FetchError>,
    },
}

impl From<JsValue> for FetchError {
    fn from(value: JsValue) -> Self {
        Self::Js(JsError::from(value))
    }
}

impl From<FetchError> for JsValue {
    fn from(value: FetchError) -> Self {
        JsValue::from(value.to_string())
    }
}

pub trait ResultContext<T> {
    fn context<S: Into<String>>(self, context: S) -> Result<T, FetchError>;
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T, FetchError>;
}

impl<T, E: Into<FetchError>> ResultContext<T> for Result<T, E> {
    fn context<S: Into<String>>(self, context: S) -> Result<T, FetchError> {
        self.map_err(|e| FetchError::WithContext {
            context: context.into(),
            inner: Box::new(e.into()),
        })
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T, FetchError> {
        self.map_err(|e| FetchError::WithContext {
            context: f().into(),
            inner: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_context_wraps_the_inner_error() {
        let r: Result<(), FetchError> = Err(FetchError::Status {
            url: "http://host/x".to_string(),
            status: 503,
        });
        let wrapped = r.context("precache").unwrap_err();

        let message = wrapped.to_string();
        assert!(message.starts_with("precache: "));
        assert!(message.contains("503"));
    }
}
