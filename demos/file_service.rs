use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use structopt::StructOpt;

use waypoint::handler::static_files::{StaticFiles, StaticOptions};
use waypoint::prelude::*;

#[derive(Debug, StructOpt)]
#[structopt(name = "file_service", about = "Example cached file server.")]
struct Opt {
    /// Port to listen on
    #[structopt(short, long, default_value = "8080")]
    port: u16,
    /// Directory to serve
    #[structopt(short, long, parse(from_os_str), default_value = "./")]
    dir: PathBuf,
    /// Request handling threads
    #[structopt(long, default_value = "4")]
    threads: usize,
    /// Socket timeout in seconds, 0 for none
    #[structopt(long, default_value = "10")]
    timeout: u64,
    /// Response cache capacity in entries
    #[structopt(long, default_value = "128")]
    cache_entries: usize,
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,
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

    // One registry shared by the static handler (which stores) and the
    // dispatcher (which probes), so both see the same cache instance.
    let registry = Arc::new(CacheRegistry::new());
    let cache = registry.open(opt.cache_entries, "static");

    let assets = StaticFiles::new(
        "",
        StaticOptions::new(&opt.dir).with_cache(Arc::clone(&cache)),
    )
    .unwrap();
    let routes = Routes::new().with_route("/:filename+", assets);

    let socket_timeout = match opt.timeout {
        0 => None,
        seconds => Some(Duration::from_secs(seconds)),
    };
    let options = ServeOptions::new()
        .with_port(opt.port)
        .with_threads(opt.threads)
        .with_timeout(socket_timeout)
        .with_registry(registry)
        .with_cache(opt.cache_entries)
        .with_cache_id("static")
        .with_on_listen(|addr| println!("Serving files, check out: http://{}", addr));

    serve(routes, options).unwrap();
}
