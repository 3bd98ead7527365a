use actix_web::{HttpResponse, Result};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// The whole view ships as one embedded page.
pub async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML))
}
