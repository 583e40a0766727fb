use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use structopt::StructOpt;

use waypoint::prelude::*;
use waypoint::validate::{validate_request, MethodTerms, Terms};

#[derive(Debug, StructOpt)]
#[structopt(name = "api_service", about = "Example JSON API.")]
struct Opt {
    #[structopt(short, long, default_value = "8080")]
    port: u16,
    #[structopt(long, default_value = "4")]
    threads: usize,
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,
}

lazy_static! {
    static ref GREETING_TERMS: Terms = Terms::new()
        .with_method(Method::GET, MethodTerms::new())
        .with_method(Method::POST, MethodTerms::new().with_body_field("name"));
}

static VISITS: AtomicU64 = AtomicU64::new(0);

fn handle_home(_req: &Request, _conn: &ConnInfo, _params: &PathParams) -> HandlerResult {
    Ok(Reply::View(Page::new("waypoint demo").with_body(
        "<h1>waypoint</h1>\n<p>GET /greeting, or POST a JSON body with a \"name\" field.</p>",
    )))
}

fn handle_greeting(req: &Request, _conn: &ConnInfo, _params: &PathParams) -> HandlerResult {
    let body = match validate_request(req, &GREETING_TERMS) {
        Ok(body) => body,
        Err(invalid) => {
            return Ok(Reply::Http(error_json(
                &invalid.message,
                invalid.status_code,
            )))
        }
    };
    let name = body
        .as_ref()
        .and_then(|b| b["name"].as_str())
        .unwrap_or("world")
        .to_string();
    let visits = VISITS.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(Reply::Http(json(
        &serde_json::json!({
            "greeting": format!("Hello, {}!", name),
            "visits": visits,
        }),
        ResponseInit::new(),
    )))
}

fn main() {
    let opt = Opt::from_args();

    stderrlog::new()
        .module(module_path!())
        .module("waypoint")
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .init()
        .unwrap();

    let routes = Routes::new()
        .with_route("/", handle_home)
        .with_route("/greeting", handle_greeting);

    let options = ServeOptions::new()
        .with_port(opt.port)
        .with_threads(opt.threads)
        .with_on_listen(|addr| println!("API listening on http://{}", addr));

    serve(routes, options).unwrap();
}
