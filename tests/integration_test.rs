use std::fs;
use std::sync::Arc;

use waypoint::cache::CACHE_HIT_HEADER;
use waypoint::handler::static_files::{StaticFiles, StaticOptions};
use waypoint::io::ReadWriteAdapter;
use waypoint::prelude::*;
use waypoint::server::StreamServer;
use waypoint::validate::{validate_request, MethodTerms, Terms};

fn handle_hello(_req: &Request, _conn: &ConnInfo, params: &PathParams) -> HandlerResult {
    let name = params.get("name").unwrap_or("world");
    Ok(Reply::Http(
        Response::new(200).with_body(format!("Hello, {}!", name).into_bytes()),
    ))
}

fn handle_missing(_req: &Request, _conn: &ConnInfo, _params: &PathParams) -> HandlerResult {
    Err(HandlerError::NotFound)
}

fn handle_broken(_req: &Request, _conn: &ConnInfo, _params: &PathParams) -> HandlerResult {
    Err(HandlerError::failure("something gave out"))
}

fn handle_echo(req: &Request, _conn: &ConnInfo, _params: &PathParams) -> HandlerResult {
    let terms =
        Terms::new().with_method(Method::POST, MethodTerms::new().with_body_field("name"));
    match validate_request(req, &terms) {
        Ok(body) => Ok(Reply::Http(json(&body, ResponseInit::new()))),
        Err(invalid) => Ok(Reply::Http(error_json(
            &invalid.message,
            invalid.status_code,
        ))),
    }
}

fn routes() -> Routes {
    Routes::new()
        .with_route("/hello/:name", handle_hello)
        .with_route("/missing", handle_missing)
        .with_route("/broken", handle_broken)
        .with_route("/echo", handle_echo)
}

fn request_for(path: &str) -> Request {
    let mut request = Request::default();
    request.path = path.to_string();
    request
}

fn serve_bytes(raw: &[u8], routes: Routes) -> String {
    let mut write_buf = vec![];
    let stream = ReadWriteAdapter::new(raw, &mut write_buf);
    let mut server = StreamServer::new(stream, routes);
    server.serve_one().unwrap();
    String::from_utf8(write_buf).unwrap()
}

#[test]
fn test_path_param_reaches_handler_over_the_wire() {
    let response = serve_bytes(
        b"GET /hello/Ada HTTP/1.1\r\nHost: localhost\r\n\r\n",
        routes(),
    );
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with("Hello, Ada!"));
}

#[test]
fn test_unmatched_path_gets_default_404_page() {
    let response = serve_bytes(b"GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n", routes());
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(response.contains("text/html"));
    assert!(response.contains("<h1>404</h1>"));
}

#[test]
fn test_not_found_error_uses_fallback_not_500() {
    let response = handle_request(
        &request_for("/missing"),
        &ConnInfo::default(),
        &routes(),
        None,
    );
    assert_eq!(response.status_code, 404);
    assert_eq!(
        response.header("content-type"),
        Some("text/html; charset=utf-8")
    );
}

#[test]
fn test_handler_failure_becomes_json_500() {
    let response = handle_request(
        &request_for("/broken"),
        &ConnInfo::default(),
        &routes(),
        None,
    );
    assert_eq!(response.status_code, 500);
    let body: serde_json::Value = serde_json::from_slice(response.body.as_ref().unwrap()).unwrap();
    assert_eq!(body["error"], "something gave out");
}

#[test]
fn test_post_body_validation_round_trip() {
    let ok = serve_bytes(
        b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 14\r\n\r\n{\"name\":\"Ada\"}",
        routes(),
    );
    assert!(ok.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(ok.contains("\"name\":\"Ada\""));

    let missing = serve_bytes(
        b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 2\r\n\r\n{}",
        routes(),
    );
    assert!(missing.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(missing.contains("name"));
}

#[test]
fn test_method_not_in_terms_is_405_over_the_wire() {
    let response = serve_bytes(b"GET /echo HTTP/1.1\r\nHost: localhost\r\n\r\n", routes());
    assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(response.contains("not allowed"));
}

#[test]
fn test_cached_static_file_survives_deletion() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("hello.txt"), b"cached contents").unwrap();

    let registry = CacheRegistry::new();
    let cache = registry.open(8, "static");
    let assets = StaticFiles::new(
        "",
        StaticOptions::new(tmp.path()).with_cache(Arc::clone(&cache)),
    )
    .unwrap();
    let routes = Routes::new().with_route("/files/:filename+", assets);

    let request = request_for("/files/hello.txt");
    let first = handle_request(&request, &ConnInfo::default(), &routes, Some(&*cache));
    assert_eq!(first.status_code, 200);
    assert_eq!(first.header(CACHE_HIT_HEADER), None);
    assert_eq!(first.header("content-type"), Some("text/plain"));

    // The stored response outlives the file: the dispatcher's cache probe
    // answers before the handler would hit the filesystem.
    fs::remove_file(tmp.path().join("hello.txt")).unwrap();
    let second = handle_request(&request, &ConnInfo::default(), &routes, Some(&*cache));
    assert_eq!(second.status_code, 200);
    assert_eq!(second.header(CACHE_HIT_HEADER), Some("true"));
    assert_eq!(second.body, Some(b"cached contents".to_vec()));
}

#[test]
fn test_stream_server_cache_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("app.js"), b"console.log(1)").unwrap();

    let registry = CacheRegistry::new();
    let cache = registry.open(8, "assets");
    let assets = StaticFiles::new(
        "",
        StaticOptions::new(tmp.path()).with_cache(Arc::clone(&cache)),
    )
    .unwrap();
    let routes = Routes::new().with_route("/assets/:filename+", assets);

    let raw = b"GET /assets/app.js HTTP/1.1\r\nHost: localhost\r\n\r\nGET /assets/app.js HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let mut written = vec![];
    let stream = ReadWriteAdapter::new(&raw[..], &mut written);
    let mut server = StreamServer::new(stream, routes).with_cache(cache);
    server.serve_one().unwrap();
    server.serve_one().unwrap();

    // Only the second response is served out of the cache.
    let text = String::from_utf8(written).unwrap();
    assert_eq!(text.matches("x-function-cache-hit: true").count(), 1);
    assert_eq!(text.matches("console.log(1)").count(), 2);
    assert_eq!(text.matches("text/javascript").count(), 2);
}

#[test]
fn test_trailing_capture_spans_subdirectories() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("css")).unwrap();
    fs::write(tmp.path().join("css/site.css"), b"body {}").unwrap();

    let assets = StaticFiles::new("", StaticOptions::new(tmp.path())).unwrap();
    let routes = Routes::new().with_route("/assets/:filename+", assets);

    let response = handle_request(
        &request_for("/assets/css/site.css"),
        &ConnInfo::default(),
        &routes,
        None,
    );
    assert_eq!(response.status_code, 200);
    assert_eq!(response.header("content-type"), Some("text/css"));
    assert_eq!(response.body, Some(b"body {}".to_vec()));
}

#[test]
fn test_missing_static_file_gets_404_page() {
    let tmp = tempfile::tempdir().unwrap();
    let assets = StaticFiles::new("", StaticOptions::new(tmp.path())).unwrap();
    let routes = Routes::new().with_route("/assets/:filename+", assets);

    let response = handle_request(
        &request_for("/assets/never-written.txt"),
        &ConnInfo::default(),
        &routes,
        None,
    );
    assert_eq!(response.status_code, 404);
    assert_eq!(
        response.header("content-type"),
        Some("text/html; charset=utf-8")
    );
}
