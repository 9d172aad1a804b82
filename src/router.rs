//! Route table and request dispatch.
//!
//! One radix tree keyed by path pattern; each pattern owns a table of
//! handlers keyed by HTTP method. Resolution happens in two steps:
//!
//! 1. Match the path against the patterns. No match: plain `404` with an
//!    empty body.
//! 2. Look the method up in the matched pattern's table. No handler: `404`
//!    with a message naming the path and method. Not `405`.
//!
//! The table is built once at startup and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use tracing::{info, warn};

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

// ── MethodRouter ──────────────────────────────────────────────────────────────

/// The handlers registered for one route pattern, keyed by HTTP method.
///
/// ```rust,no_run
/// # use quill::{MethodRouter, Request, Response};
/// # async fn index(_: Request) -> Response { Response::empty_ok() }
/// # async fn create(_: Request) -> Response { Response::empty_ok() }
/// MethodRouter::new().get(index).post(create);
/// ```
#[derive(Default)]
pub struct MethodRouter {
    handlers: HashMap<Method, BoxedHandler>,
}

impl MethodRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method`, replacing any earlier registration.
    pub fn on(mut self, method: Method, handler: impl Handler) -> Self {
        self.handlers.insert(method, handler.into_boxed_handler());
        self
    }

    pub fn get(self, handler: impl Handler) -> Self { self.on(Method::GET, handler) }
    pub fn post(self, handler: impl Handler) -> Self { self.on(Method::POST, handler) }
    pub fn put(self, handler: impl Handler) -> Self { self.on(Method::PUT, handler) }
    pub fn patch(self, handler: impl Handler) -> Self { self.on(Method::PATCH, handler) }
    pub fn delete(self, handler: impl Handler) -> Self { self.on(Method::DELETE, handler) }

    /// Methods with a registered handler, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.handlers.keys()
    }

    fn handler(&self, method: &Method) -> Option<BoxedHandler> {
        self.handlers.get(method).map(Arc::clone)
    }
}

impl fmt::Debug for MethodRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.handlers.keys().map(Method::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("MethodRouter").field("methods", &methods).finish()
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Outcome of resolving a (method, path) pair.
pub(crate) enum Resolution {
    /// Path and method both matched.
    Handler(BoxedHandler, HashMap<String, String>),
    /// Path matched a pattern that has no handler for the method.
    MethodNotRegistered,
    /// No pattern matched the path.
    NoRoute,
}

/// The application router.
///
/// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
///
/// ```rust,no_run
/// # use quill::{MethodRouter, Request, Response, Router};
/// # async fn index(_: Request) -> Response { Response::empty_ok() }
/// # async fn find(_: Request) -> Response { Response::empty_ok() }
/// # async fn remove(_: Request) -> Response { Response::empty_ok() }
/// Router::new()
///     .route("/posts", MethodRouter::new().get(index))
///     .route("/posts/{id}", MethodRouter::new().get(find).delete(remove));
/// ```
pub struct Router {
    tree: MatchitRouter<MethodRouter>,
    patterns: Vec<String>,
}

impl Router {
    pub fn new() -> Self {
        Self { tree: MatchitRouter::new(), patterns: Vec::new() }
    }

    /// Builds a router from a table of route pattern to method handlers.
    pub fn from_table<I, P>(table: I) -> Self
    where
        I: IntoIterator<Item = (P, MethodRouter)>,
        P: AsRef<str>,
    {
        table
            .into_iter()
            .fold(Self::new(), |router, (pattern, methods)| router.route(pattern.as_ref(), methods))
    }

    /// Register the handlers for `pattern`. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is malformed or conflicts with an already
    /// registered pattern. Route tables are static, so this surfaces at
    /// startup.
    pub fn route(mut self, pattern: &str, methods: MethodRouter) -> Self {
        self.tree
            .insert(pattern, methods)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        self.patterns.push(pattern.to_owned());
        self
    }

    /// Registered route patterns in registration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub(crate) fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let Ok(matched) = self.tree.at(path) else {
            return Resolution::NoRoute;
        };
        match matched.value.handler(method) {
            Some(handler) => {
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                Resolution::Handler(handler, params)
            }
            None => Resolution::MethodNotRegistered,
        }
    }

    /// Routes one request and produces one response.
    ///
    /// Every request whose path matches a registered pattern is logged with
    /// its method and URL before anything else happens to it.
    pub async fn dispatch<B>(&self, req: http::Request<B>) -> Response
    where
        B: Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = req.into_parts();

        let (handler, params) = match self.resolve(&parts.method, parts.uri.path()) {
            Resolution::NoRoute => return Response::status(StatusCode::NOT_FOUND),
            Resolution::MethodNotRegistered => {
                info!(method = %parts.method, url = %parts.uri, "request");
                return Response::not_found_for(&parts.method, parts.uri.path());
            }
            Resolution::Handler(handler, params) => {
                info!(method = %parts.method, url = %parts.uri, "request");
                (handler, params)
            }
        };

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(url = %parts.uri, "failed to read request body: {e}");
                return Response::bad_request(e.to_string());
            }
        };

        handler.call(Request::new(parts, body, params)).await
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("patterns", &self.patterns).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use serde_json::{Value, json};

    async fn echo_id(req: Request) -> Response {
        Response::ok(&json!({ "id": req.param("id"), "method": req.method().as_str() }))
    }

    async fn echo_body(req: Request) -> Response {
        match req.json::<Value>() {
            Ok(value) => Response::created(&value),
            Err(e) => Response::bad_request(e.to_string()),
        }
    }

    fn router() -> Router {
        Router::from_table([
            ("/posts", MethodRouter::new().get(echo_id).post(echo_body)),
            ("/posts/{id}", MethodRouter::new().get(echo_id).delete(echo_id)),
        ])
    }

    fn request(method: Method, uri: &str, body: &'static str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    fn body_json(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn dispatches_to_method_handler_with_params() {
        let response = router().dispatch(request(Method::DELETE, "/posts/42", "")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(body_json(&response), json!({ "id": "42", "method": "DELETE" }));
    }

    #[tokio::test]
    async fn passes_body_to_handler() {
        let response = router().dispatch(request(Method::POST, "/posts", r#"{"a":1}"#)).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(body_json(&response), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn known_route_unknown_method_is_404_with_message() {
        let response = router().dispatch(request(Method::PUT, "/posts", "")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let message = body_json(&response)["message"].as_str().unwrap().to_owned();
        assert_eq!(message, "no handler registered at route /posts for method PUT");
    }

    #[tokio::test]
    async fn method_mismatch_names_concrete_path() {
        let response = router().dispatch(request(Method::PATCH, "/posts/5", "")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let message = body_json(&response)["message"].as_str().unwrap().to_owned();
        assert!(message.contains("/posts/5"));
        assert!(message.contains("PATCH"));
    }

    #[tokio::test]
    async fn unknown_path_is_empty_404() {
        let response = router().dispatch(request(Method::GET, "/comments", "")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn query_string_does_not_affect_matching() {
        let response = router().dispatch(request(Method::GET, "/posts/3?verbose=1", "")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(body_json(&response)["id"], "3");
    }

    #[tokio::test]
    async fn closures_capture_state() {
        let greeting = Arc::new(String::from("hi"));
        let router = Router::new().route(
            "/greet",
            MethodRouter::new().get(move |_req: Request| {
                let greeting = Arc::clone(&greeting);
                async move { Response::ok_message(greeting.as_str()) }
            }),
        );
        let response = router.dispatch(request(Method::GET, "/greet", "")).await;
        assert_eq!(body_json(&response), json!({ "message": "hi" }));
    }

    #[test]
    fn records_patterns_in_order() {
        assert_eq!(router().patterns(), ["/posts", "/posts/{id}"]);
    }

    #[test]
    fn method_router_lists_methods() {
        let methods = MethodRouter::new().get(echo_id).put(echo_id);
        assert_eq!(format!("{methods:?}"), r#"MethodRouter { methods: ["GET", "PUT"] }"#);
    }

    #[test]
    #[should_panic(expected = "invalid route `/posts/{id}`")]
    fn conflicting_pattern_panics() {
        Router::new()
            .route("/posts/{id}", MethodRouter::new())
            .route("/posts/{id}", MethodRouter::new());
    }
}
