use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;

use super::types::{OptionsResponse, RateLimitInfo};
use crate::services::{GenerationService, StyleCatalog};

/// `GET /options`：风格目录与限流信息
pub async fn get_options(service: web::Data<Arc<GenerationService>>) -> impl Responder {
    let limiter = service.limiter();
    let rate_limit = limiter.window().map(|window| RateLimitInfo {
        limit: window.limit,
        window_hours: window.window_hours(),
        backend: limiter.backend_name().to_string(),
    });

    HttpResponse::Ok().json(OptionsResponse {
        catalog: StyleCatalog::build(),
        rate_limit,
    })
}

pub fn options_routes() -> actix_web::Resource {
    web::resource("/options").route(web::get().to(get_options))
}
