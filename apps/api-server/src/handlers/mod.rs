//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;

use actix_web::{HttpResponse, web};
use quill_shared::ApiResponse;
use serde::Serialize;
use serde_json::Value;

use crate::middleware::error::{AppError, json_config, query_config};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
        )
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Auth routes
                .service(
                    web::scope("/auth")
                        .route("/login", web::post().to(auth::login))
                        .route("/logout", web::post().to(auth::logout))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/user")
                        .route("", web::post().to(users::create_user))
                        .route("/{id}", web::get().to(users::get_user))
                        .route("/{id}", web::put().to(users::update_user))
                        .route("/{id}", web::delete().to(users::delete_user))
                        .route("/{id}/posts", web::get().to(users::user_posts)),
                )
                .service(
                    web::scope("/post")
                        .route("", web::get().to(posts::list_posts))
                        .route("", web::post().to(posts::create_post))
                        .route("/{id}", web::get().to(posts::get_post))
                        .route("/{id}", web::put().to(posts::update_post))
                        .route("/{id}", web::delete().to(posts::delete_post)),
                ),
        );
}

/// Wrap an action result in the success envelope.
fn respond<T: Serialize>(result: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(result))
}

/// Merge the `{id}` path segment into a JSON body.
fn with_id(body: Value, id: i32) -> Value {
    match body {
        Value::Object(mut map) => {
            map.insert("id".to_string(), id.into());
            Value::Object(map)
        }
        // Left as-is so props parsing reports it
        other => other,
    }
}
