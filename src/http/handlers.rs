//! Request handlers and the default route table.

use axum::{http::Uri, routing::any, Router};
use percent_encoding::percent_decode_str;
use tower_http::services::ServeFile;

use crate::config::ServerConfig;

/// Text returned for a requested path (without its leading slash).
pub fn greeting(path: &str) -> String {
    format!("The page you requested ({path}) says Hello!")
}

/// Percent-decoded request path. Escapes that are not UTF-8 become U+FFFD.
pub fn decoded_path(uri: &Uri) -> String {
    percent_decode_str(uri.path()).decode_utf8_lossy().into_owned()
}

pub async fn hello(uri: Uri) -> String {
    let path = decoded_path(&uri);
    greeting(path.strip_prefix('/').unwrap_or(&path))
}

/// `/` and everything below it greet; `/favicon.ico` comes from the public directory.
pub fn routes(config: &ServerConfig) -> Router {
    let favicon = config.static_files.public_dir.join("favicon.ico");

    Router::new()
        .route("/", any(hello))
        .route("/{*path}", any(hello))
        .route_service("/favicon.ico", ServeFile::new(favicon))
}
