//! Server-rendered HTML views.
//!
//! Handlers can return a [`Page`] instead of a finished response; the
//! dispatcher renders it into a `text/html` response with the page's
//! status code.
use crate::response::Response;

const PAGE_CSS: &str = "body { width: 35em; margin: 0 auto; font-family: sans-serif; }";

/// A minimal renderable HTML page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub status_code: u16,
    pub title: String,
    pub body: String,
}

impl Page {
    pub fn new(title: &str) -> Self {
        Self {
            status_code: 200,
            title: title.to_string(),
            body: "".to_string(),
        }
    }
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }
    /// Set the HTML fragment placed inside `<body>`.
    pub fn with_body(mut self, html: &str) -> Self {
        self.body = html.to_string();
        self
    }
    /// Render the full HTML document.
    pub fn render(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>",
            self.title, PAGE_CSS, self.body
        )
    }
    pub fn into_response(self) -> Response {
        let html = self.render();
        Response::new(self.status_code)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(html.into_bytes())
    }
}

/// The built-in fallback page served when no route matches.
pub fn not_found_page() -> Page {
    Page::new("404 Not Found")
        .with_status_code(404)
        .with_body("<h1>404</h1>\n<p>Not Found</p>")
}
