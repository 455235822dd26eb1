//! Abstracts routing logic from the HTTP server

use std::{collections::HashMap, iter};

use async_trait::async_trait;
use http_body_util::Full;
use hyper::{
    HeaderMap, Method, Response, StatusCode, Uri,
    body::Bytes,
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE, HeaderValue,
    },
};
use itertools::Itertools;
use matchit::Router as MatchRouter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use super::error::ApiServerError;

/// A type alias for URL generic params maps, i.e. /path/to/resource/:id
pub(super) type UrlParams = HashMap<String, String>;
/// The body type of every response
pub(crate) type ResponseBody = Full<Bytes>;

/// The maximum time an OPTIONS request to our HTTP API may be cached, we go
/// above the default of 5 seconds to avoid unnecessary pre-flights
const PREFLIGHT_CACHE_TIME: &str = "7200"; // 2 hours, Chromium max

// -----------
// | Helpers |
// -----------

/// Builds an HTTP response with the given status and a plain text body
pub(super) fn build_response_from_status_code(
    status_code: StatusCode,
    err: String,
) -> Response<ResponseBody> {
    let mut resp = Response::new(Full::new(Bytes::from(err)));
    *resp.status_mut() = status_code;
    resp
}

/// Builds an HTTP 400 (Bad Request) response
pub(super) fn build_400_response(err: String) -> Response<ResponseBody> {
    build_response_from_status_code(StatusCode::BAD_REQUEST, err)
}

/// Builds an HTTP 404 (Not Found) response
pub(super) fn build_404_response(err: String) -> Response<ResponseBody> {
    build_response_from_status_code(StatusCode::NOT_FOUND, err)
}

/// Builds an HTTP 500 (Internal Server Error) response
pub(super) fn build_500_response(err: String) -> Response<ResponseBody> {
    build_response_from_status_code(StatusCode::INTERNAL_SERVER_ERROR, err)
}

/// Deserialize a request body
///
/// An empty body stands in for a unit request or for a request whose fields
/// are all optional
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    if !body.is_empty() {
        return serde_json::from_slice(body);
    }

    serde_json::from_slice(b"null").or_else(|_| serde_json::from_slice(b"{}"))
}

// -------------------------
// | Trait Implementations |
// -------------------------

/// A handler is attached to a route and handles the process of translating an
/// abstract request type into a response
#[async_trait]
pub trait Handler: Send + Sync {
    /// The handler method for the request/response on the handler's route
    async fn handle(
        &self,
        headers: HeaderMap,
        body: Bytes,
        url_params: UrlParams,
    ) -> Response<ResponseBody>;
}

/// A handler that has associated Request/Response type information attached to
/// it. We implement this as a subtrait so that the router can store trait
/// objects (associated types are disallowed on trait objects) as Handler that
/// concretely re-use the default serialization/deserialization logic below
#[async_trait]
pub trait TypedHandler: Send + Sync {
    /// The request type that the handler consumes
    type Request: DeserializeOwned + Send;
    /// The response type that the handler returns
    type Response: Serialize + Send;

    /// The handler logic, translate request into response
    async fn handle_typed(
        &self,
        headers: HeaderMap,
        req: Self::Request,
        url_params: UrlParams,
    ) -> Result<Self::Response, ApiServerError>;
}

/// Auto-implementation of the Handler trait for a TypedHandler which covers the
/// process of deserializing the request, reporting errors, and serializing the
/// response into a body
#[async_trait]
impl<T: TypedHandler> Handler for T {
    async fn handle(
        &self,
        headers: HeaderMap,
        body: Bytes,
        url_params: UrlParams,
    ) -> Response<ResponseBody> {
        // Deserialize the request into the request type, return HTTP 400 if
        // deserialization fails
        let req: T::Request = match parse_body(&body) {
            Ok(req) => req,
            Err(e) => return build_400_response(e.to_string()),
        };

        let res = self.handle_typed(headers, req, url_params).await;
        let mut resp = match res.and_then(|resp| {
            serde_json::to_vec(&resp).map_err(ApiServerError::server_failure)
        }) {
            Ok(body) => {
                let mut resp = Response::new(Full::new(Bytes::from(body)));
                let content_type = HeaderValue::from_static("application/json");
                resp.headers_mut().insert(CONTENT_TYPE, content_type);
                resp
            },
            Err(e) => e.into(),
        };

        // Callers are expected to be local tooling on a different origin port
        resp.headers_mut().insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        resp
    }
}

/// Wrapper around a matchit router that allows different HTTP request types to
/// be matches
pub struct Router {
    /// The underlying router
    router: MatchRouter<Box<dyn Handler>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a new router with no routes established
    pub fn new() -> Self {
        Self { router: MatchRouter::new() }
    }

    /// Helper to build a routable path from a method and a concrete route
    ///
    /// The `matchit::Router` works only on URLs directly; so we prepend the
    /// operation type to the URL when creating the route
    ///
    /// Concretely, if POST is valid to /route then we route to /POST/route
    fn create_full_route(method: &Method, mut route: String) -> String {
        // Prepend a "/" if not already done
        if !route.starts_with('/') {
            route = String::from("/") + &route;
        }

        // Matchit is URL only, so we prepend the request type to match directly
        format!("/{method}{route}")
    }

    /// Add a route to the router
    pub fn add_route<H: Handler + 'static>(
        &mut self,
        method: &Method,
        route: String,
        handler: H,
    ) -> Result<(), ApiServerError> {
        debug!("Attached handler to route {route} with method {method}");
        let full_route = Self::create_full_route(method, route);

        self.router.insert(full_route, Box::new(handler)).map_err(ApiServerError::setup)
    }

    /// Route a request to a handler
    #[instrument(skip_all, fields(
        http.status_code,
        http.method = %method,
        http.route = %route,
    ))]
    pub async fn handle_req(
        &self,
        method: Method,
        route: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response<ResponseBody> {
        let path = route.path();
        let res = if method == Method::OPTIONS {
            self.handle_options_req(path)
        } else {
            let full_route = Self::create_full_route(&method, path.to_string());
            if let Ok(matched_path) = self.router.at(&full_route) {
                let handler = matched_path.value;
                let params_map = matched_path
                    .params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect();

                handler.as_ref().handle(headers, body, params_map).await
            } else {
                build_404_response(format!("Route {route} for method {method} not found"))
            }
        };

        tracing::Span::current().record("http.status_code", res.status().as_str());
        res
    }

    /// Handle an options request
    fn handle_options_req(&self, route: &str) -> Response<ResponseBody> {
        // Get the set of allowed methods for this route
        let allowed_methods_str = [Method::GET, Method::POST]
            .into_iter()
            .filter(|method| {
                let full_route = Self::create_full_route(method, route.to_owned());
                self.router.at(&full_route).is_ok()
            })
            // All routes allow OPTIONS
            .chain(iter::once(Method::OPTIONS))
            .map(|method| method.to_string())
            .join(",");

        let mut resp = Response::new(Full::new(Bytes::new()));
        let headers = resp.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(PREFLIGHT_CACHE_TIME));
        if let Ok(methods) = HeaderValue::from_str(&allowed_methods_str) {
            headers.insert(ACCESS_CONTROL_ALLOW_METHODS, methods);
        }

        resp
    }
}
