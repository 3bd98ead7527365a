use crate::handlers;
use actix_web::{web, Scope};

pub fn config() -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health_check))
        .route("/search", web::post().to(handlers::search))
}
