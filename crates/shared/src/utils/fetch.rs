use gloo::net::http::{Method, RequestBuilder, Response};
use headers::{CacheControl, Header};
use http::header::CACHE_CONTROL;
use tracing::debug;

use crate::error::{FetchError, ResultContext};

/// How many retries to do on a failed fetch request
pub const FETCH_RETRIES: usize = 3;

/// Adds `Cache-Control: no-store` so the browser HTTP cache can't satisfy
/// the request. Precaching has to read the live file, otherwise a stale
/// copy could be committed into a fresh cache namespace.
fn no_cache(builder: RequestBuilder) -> RequestBuilder {
    let cc = CacheControl::new().with_no_store();
    let mut headers = Vec::with_capacity(1);
    cc.encode(&mut headers);

    let value = headers.pop().expect("CacheControl::encode should be infallible...");
    let str = value.to_str().expect("CacheControl::encode valid str");

    builder.header(CACHE_CONTROL.as_str(), str)
}

/// Perform a request, bypassing the browser HTTP cache
///
/// Non-2xx statuses are returned as errors so callers never mistake an
/// error page for the resource they asked for
///
/// Retries FETCH_RETRIES times on failure
pub async fn simple_request(method: Method, url: &str) -> Result<Response, FetchError> {
    let method = &method;

    for retry in 0..=FETCH_RETRIES {
        let r = async move {
            debug!("simple_request({method}, {url})");

            let request = no_cache(RequestBuilder::new(url))
                .method(method.clone())
                .build()
                .map_err(FetchError::from)
                .with_context(|| format!("Building request for {method} {url}"))?;

            let response = request
                .send()
                .await
                .map_err(FetchError::from)
                .with_context(|| format!("Sending {method} {url}"))?;

            if !response.ok() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: response.status(),
                });
            }

            Ok(response)
        }
        .await;

        if r.is_ok() || retry == FETCH_RETRIES {
            return r;
        }
        debug!("simple_request::retrying ({})", retry + 1);
    }

    unreachable!()
}
