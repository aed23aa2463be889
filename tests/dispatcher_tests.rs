use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chainrouter::config::RouterConfig;
use chainrouter::dispatcher::DispatchOutcome;
use chainrouter::handler::{HandlerContext, HandlerRef, Reply, Service};
use chainrouter::router::{Registrar, RouteOptions, RouterBuilder};
use chainrouter::server::AmbientRequest;
use chainrouter::RouterError;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::tracing_util::TestTracing;

fn text(outcome: DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Text(s) => s,
        other => panic!("expected text outcome, got {other:?}"),
    }
}

#[test]
fn test_first_registered_route_is_dispatched() {
    let mut builder = RouterBuilder::new();
    builder.register("First", |_: &mut HandlerContext<'_>| Ok(Reply::from("first")));
    builder.register("Second", |_: &mut HandlerContext<'_>| Ok(Reply::from("second")));
    builder.get("/items/(.+)", "First");
    builder.get("/items/special", "Second");
    let dispatcher = builder.build().unwrap();

    let outcome = dispatcher.dispatch(&Method::GET, "/items/special").unwrap();
    assert_eq!(text(outcome), "first");
}

#[test]
fn test_missing_method_bucket_calls_error_handler_with_method_and_path() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);

    let mut builder = RouterBuilder::new();
    builder.get("/users", HandlerRef::invokable(|_: &mut HandlerContext<'_>| Ok(Reply::Empty)));
    builder.set_not_found(Some(HandlerRef::invokable(move |ctx: &mut HandlerContext<'_>| {
        seen_in_handler.lock().unwrap().extend(ctx.params().iter().cloned());
        assert!(ctx.options().is_none());
        Ok(Reply::from("custom 404"))
    })));
    let dispatcher = builder.build().unwrap();

    let outcome = dispatcher.dispatch(&Method::DELETE, "/users/7").unwrap();
    assert_eq!(text(outcome), "custom 404");
    assert_eq!(*seen.lock().unwrap(), vec!["DELETE".to_string(), "/users/7".to_string()]);
}

#[test]
fn test_set_not_found_none_restores_default() {
    let mut builder = RouterBuilder::new();
    builder.set_not_found(Some(HandlerRef::invokable(|_: &mut HandlerContext<'_>| {
        Ok(Reply::from("custom"))
    })));
    builder.set_not_found(None);
    let dispatcher = builder.build().unwrap();

    let response = dispatcher
        .dispatch(&Method::GET, "/nowhere")
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.body().is_empty());
}

#[test]
fn test_alias_resolves_against_base_namespace() {
    let mut builder = RouterBuilder::with_config(RouterConfig::with_namespace("App"));
    builder.register("App::Foo::bar", |_: &mut HandlerContext<'_>| Ok(Reply::from("resolved")));
    builder.get("/foo", "@Foo.bar");
    builder.get("/pair", ("@Foo", "bar"));
    let dispatcher = builder.build().unwrap();

    assert_eq!(text(dispatcher.dispatch(&Method::GET, "/foo").unwrap()), "resolved");
    assert_eq!(text(dispatcher.dispatch(&Method::GET, "/pair").unwrap()), "resolved");
}

#[test]
fn test_empty_handler_name_fails_at_dispatch_not_registration() {
    let mut builder = RouterBuilder::new();
    builder.get("/broken", "");
    let dispatcher = builder.build().unwrap();

    let err = dispatcher.dispatch(&Method::GET, "/broken").unwrap_err();
    assert!(matches!(err, RouterError::InvalidCallable(_)));
}

#[test]
fn test_unregistered_name_is_reported() {
    let mut builder = RouterBuilder::new();
    builder.get("/ghost", "Ghost.handler");
    let dispatcher = builder.build().unwrap();

    match dispatcher.dispatch(&Method::GET, "/ghost") {
        Err(RouterError::UnknownHandler { name }) => assert_eq!(name, "Ghost::handler"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_handler_errors_propagate_unmodified() {
    let mut builder = RouterBuilder::new();
    builder.get(
        "/fail",
        HandlerRef::invokable(|_: &mut HandlerContext<'_>| anyhow::bail!("database down")),
    );
    let dispatcher = builder.build().unwrap();

    match dispatcher.dispatch(&Method::GET, "/fail") {
        Err(RouterError::Handler(e)) => assert_eq!(e.to_string(), "database down"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_captured_output_becomes_body() {
    let mut builder = RouterBuilder::new();
    builder.get(
        "/hello/(\\w+)",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            let name = ctx.param(0).unwrap_or_default().to_string();
            ctx.write("hello ");
            ctx.write(&name);
            Ok(Reply::Empty)
        }),
    );
    let dispatcher = builder.build().unwrap();

    let response = dispatcher
        .dispatch(&Method::GET, "/hello/world")
        .unwrap()
        .into_response();
    assert_eq!(response.body(), b"hello world");
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
}

#[test]
fn test_explicit_reply_beats_captured_output() {
    let mut builder = RouterBuilder::new();
    builder.get(
        "/both",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            ctx.write("ignored");
            Ok(Reply::Json(json!({"ok": true})))
        }),
    );
    let dispatcher = builder.build().unwrap();

    match dispatcher.dispatch(&Method::GET, "/both").unwrap() {
        DispatchOutcome::Json(v) => assert_eq!(v, json!({"ok": true})),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_empty_json_reply_falls_back_to_captured_output() {
    let mut builder = RouterBuilder::new();
    builder.get(
        "/blank",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            ctx.write("<p>printed</p>");
            Ok(Reply::Json(json!("")))
        }),
    );
    builder.get(
        "/zero",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            ctx.write("ignored");
            Ok(Reply::Json(json!(0)))
        }),
    );
    let dispatcher = builder.build().unwrap();

    assert_eq!(
        text(dispatcher.dispatch(&Method::GET, "/blank").unwrap()),
        "<p>printed</p>"
    );
    match dispatcher.dispatch(&Method::GET, "/zero").unwrap() {
        DispatchOutcome::Json(v) => assert_eq!(v, json!(0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_output_buffer_is_fresh_per_request() {
    let mut builder = RouterBuilder::new();
    builder.get(
        "/count",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            ctx.write("x");
            Ok(Reply::Empty)
        }),
    );
    let dispatcher = builder.build().unwrap();

    for _ in 0..3 {
        assert_eq!(text(dispatcher.dispatch(&Method::GET, "/count").unwrap()), "x");
    }
}

#[test]
fn test_service_reaches_handler() {
    struct Db {
        name: &'static str,
    }

    let mut builder = RouterBuilder::new();
    builder.set_service(Arc::new(Db { name: "main" }) as Service);
    builder.mount_with_service("/replica", Arc::new(Db { name: "replica" }), |r| {
        r.get("/db", "Db.name");
    });
    builder.get("/db", "Db.name");
    builder.register("Db::name", |ctx: &mut HandlerContext<'_>| {
        let db = ctx
            .service::<Db>()
            .ok_or_else(|| anyhow::anyhow!("no db"))?;
        Ok(Reply::from(db.name))
    });
    let dispatcher = builder.build().unwrap();

    assert_eq!(text(dispatcher.dispatch(&Method::GET, "/db").unwrap()), "main");
    assert_eq!(
        text(dispatcher.dispatch(&Method::GET, "/replica/db").unwrap()),
        "replica"
    );
}

#[test]
fn test_handler_is_resolved_on_every_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut builder = RouterBuilder::new();
    builder.register("Counter", move |_: &mut HandlerContext<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Reply::Empty)
    });
    builder.route(
        chainrouter::router::Methods::Any,
        "/count",
        "Counter",
        RouteOptions::default(),
    );
    let dispatcher = builder.build().unwrap();

    dispatcher.dispatch(&Method::GET, "/count").unwrap();
    dispatcher.dispatch(&Method::HEAD, "/count").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(dispatcher.router().route_count(), 8);
}

#[test]
fn test_dispatch_from_ambient_request() {
    let mut builder = RouterBuilder::new();
    builder.get(
        "/search/(.+)",
        HandlerRef::invokable(|ctx: &mut HandlerContext<'_>| {
            Ok(Reply::Text(ctx.param(0).unwrap_or_default().to_string()))
        }),
    );
    let dispatcher = builder.build().unwrap();

    let ambient = AmbientRequest::new("GET", "/search/rust+lang/?page=2");
    assert_eq!(text(dispatcher.dispatch_ambient(&ambient).unwrap()), "rust lang");

    let bad = AmbientRequest::new("G E T", "/");
    assert!(matches!(
        dispatcher.dispatch_ambient(&bad),
        Err(RouterError::InvalidMethod(_))
    ));
}

#[test]
fn test_dispatch_logs_match_and_not_found() {
    let tracing = TestTracing::init();

    let mut builder = RouterBuilder::new();
    builder.get("/ok", HandlerRef::invokable(|_: &mut HandlerContext<'_>| Ok(Reply::Empty)));
    let dispatcher = builder.build().unwrap();

    dispatcher.dispatch(&Method::GET, "/ok").unwrap();
    dispatcher.dispatch(&Method::GET, "/missing").unwrap();

    assert!(tracing.contains("Routing table loaded"));
    assert!(tracing.contains("Route matched"));
    assert!(tracing.contains("No route matched"));
    assert!(tracing.contains("Invoking not-found handler"));
}
