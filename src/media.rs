//! File extension to media type resolution.
use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;

lazy_static! {
    static ref MEDIA_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("html", "text/html");
        map.insert("htm", "text/html");
        map.insert("css", "text/css");
        map.insert("js", "text/javascript");
        map.insert("mjs", "text/javascript");
        map.insert("json", "application/json");
        map.insert("txt", "text/plain");
        map.insert("md", "text/markdown");
        map.insert("csv", "text/csv");
        map.insert("xml", "application/xml");
        map.insert("pdf", "application/pdf");
        map.insert("wasm", "application/wasm");
        map.insert("zip", "application/zip");
        map.insert("gz", "application/gzip");
        map.insert("png", "image/png");
        map.insert("jpg", "image/jpeg");
        map.insert("jpeg", "image/jpeg");
        map.insert("gif", "image/gif");
        map.insert("svg", "image/svg+xml");
        map.insert("webp", "image/webp");
        map.insert("ico", "image/x-icon");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        map.insert("ttf", "font/ttf");
        map.insert("otf", "font/otf");
        map.insert("mp3", "audio/mpeg");
        map.insert("mp4", "video/mp4");
        map.insert("webm", "video/webm");
        map
    };
}

/// Media type for a path, by file extension, compared case-insensitively.
/// None when the path has no extension or the extension is unknown.
pub fn media_type(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?;
    MEDIA_TYPES.get(&extension.to_lowercase()[..]).copied()
}
