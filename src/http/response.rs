//! HTTP response building
//!
//! Turns a finished response plan into a hyper response, and provides the
//! canned status responses the dispatcher needs.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::logger;
use crate::serve::ResponsePlan;

/// Materialize a plan and its (possibly empty) body into a hyper response.
///
/// The plan's header order is preserved as emitted by the negotiator.
pub fn from_plan(plan: &ResponsePlan, body: Bytes) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(plan.status.code());
    for (name, value) in &plan.headers {
        builder = builder.header(*name, value.as_str());
    }
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(plan.status.code(), &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error(404, &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error(405, &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(204, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 500 Internal Server Error response
///
/// Used when a request hits an internal fault (descriptor build or body
/// read failure on an existing file); the fault is logged by the caller.
pub fn build_500_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("500 Internal Server Error")))
        .unwrap_or_else(|e| {
            log_build_error(500, &e);
            Response::new(Full::new(Bytes::from("500 Internal Server Error")))
        })
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
