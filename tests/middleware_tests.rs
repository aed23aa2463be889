use chainrouter::dispatcher::Dispatcher;
use chainrouter::handler::{Body, HandlerContext, HandlerRef, Reply};
use chainrouter::middleware::{Chain, Middleware, RequestHandler, TracingMiddleware};
use chainrouter::router::{Registrar, RouterBuilder};
use chainrouter::RouterError;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{Method, Request, Response, StatusCode};
use serde_json::json;

mod common;
use common::tracing_util::TestTracing;

fn downstream(_: &Request<Body>) -> anyhow::Result<Response<Body>> {
    Ok(Response::builder()
        .header("x-downstream", "1")
        .body(b"<header/>".to_vec())?)
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::new())
        .unwrap()
}

fn dispatcher() -> Dispatcher {
    let mut builder = RouterBuilder::new();
    builder.get(
        "/page/(\\w+)",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            let name = ctx.param(0).unwrap_or_default().to_string();
            ctx.write("<p>");
            ctx.write(&name);
            ctx.write("</p>");
            Ok(Reply::Empty)
        }),
    );
    builder.get(
        "/api/status",
        HandlerRef::invokable(|_: &mut HandlerContext<'_>| Ok(Reply::Json(json!({"up": true})))),
    );
    builder.get(
        "/redirect",
        HandlerRef::invokable(|_: &mut HandlerContext<'_>| {
            let response = Response::builder()
                .status(StatusCode::FOUND)
                .header(LOCATION, "/page/home")
                .body(Body::new())?;
            Ok(Reply::Response(response))
        }),
    );
    builder.get(
        "/whoami",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            let agent = ctx
                .request()
                .and_then(|r| r.headers().get("user-agent"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            Ok(Reply::Text(agent))
        }),
    );
    builder.build().unwrap()
}

#[test]
fn test_captured_output_is_appended_to_downstream_body() {
    let router = dispatcher();
    let response = router
        .process(&request(Method::GET, "/page/about?lang=en"), &downstream)
        .unwrap();
    assert_eq!(response.body(), b"<header/><p>about</p>");
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
    assert_eq!(response.headers()["x-downstream"], "1");
}

#[test]
fn test_existing_content_type_is_kept() {
    let router = dispatcher();
    let typed = |_: &Request<Body>| -> anyhow::Result<Response<Body>> {
        Ok(Response::builder()
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::new())?)
    };
    let response = router
        .process(&request(Method::GET, "/page/x"), &typed)
        .unwrap();
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
}

#[test]
fn test_json_reply_defaults_to_json_content_type() {
    let router = dispatcher();
    let empty = |_: &Request<Body>| -> anyhow::Result<Response<Body>> { Ok(Response::new(Body::new())) };
    let response = router
        .process(&request(Method::GET, "/api/status"), &empty)
        .unwrap();
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(response.body(), br#"{"up":true}"#);
}

#[test]
fn test_response_reply_replaces_downstream_response() {
    let router = dispatcher();
    let response = router
        .process(&request(Method::GET, "/redirect"), &downstream)
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], "/page/home");
    assert!(response.headers().get("x-downstream").is_none());
}

#[test]
fn test_not_found_sets_status_and_clears_body() {
    let router = dispatcher();
    let response = router
        .process(&request(Method::POST, "/page/about"), &downstream)
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.body().is_empty());
}

#[test]
fn test_handler_sees_originating_request() {
    let router = dispatcher();
    let req = Request::builder()
        .uri("/whoami")
        .header("user-agent", "curl/8")
        .body(Body::new())
        .unwrap();
    let response = router.process(&req, &downstream).unwrap();
    assert_eq!(response.body(), b"<header/>curl/8");
}

#[test]
fn test_downstream_error_stops_dispatch() {
    let router = dispatcher();
    let failing = |_: &Request<Body>| -> anyhow::Result<Response<Body>> { anyhow::bail!("upstream timeout") };
    match router.process(&request(Method::GET, "/page/x"), &failing) {
        Err(RouterError::Handler(e)) => assert_eq!(e.to_string(), "upstream timeout"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_chain_with_tracing_and_router() {
    let tracing = TestTracing::init();

    let chain = Chain::new(downstream)
        .with(TracingMiddleware)
        .with(dispatcher());
    let response = chain.handle(&request(Method::GET, "/page/chained")).unwrap();

    assert_eq!(response.body(), b"<header/><p>chained</p>");
    assert!(tracing.contains("Request completed"));
    assert!(tracing.contains("Route matched"));
}

struct Deny;

impl Middleware for Deny {
    fn process(
        &self,
        _request: &Request<Body>,
        _next: &dyn RequestHandler,
    ) -> Result<Response<Body>, RouterError> {
        Ok(Response::builder()
            .status(StatusCode::FORBIDDEN)
            .body(Body::new())?)
    }
}

#[test]
fn test_outer_middleware_can_short_circuit() {
    let chain = Chain::new(downstream).with(Deny).with(dispatcher());
    let response = chain.run(&request(Method::GET, "/page/x")).unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
