use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, handlers, middleware as app_middleware, state::AppState};

/// Builds the full application router over the given state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout));

    // Bearer-protected routes
    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/role", get(handlers::roles::role_options))
        .route("/api/profile", patch(handlers::profile::update_profile_name))
        .route(
            "/api/profile/change-password",
            post(handlers::profile::change_password),
        )
        .route(
            "/api/courses",
            get(handlers::courses::list_courses).post(handlers::courses::upsert_course),
        )
        .route(
            "/api/courses/{id}/status",
            patch(handlers::courses::update_course_status),
        )
        .route(
            "/api/courses/{id}",
            delete(handlers::courses::delete_course),
        )
        .route(
            "/api/learning/progress",
            get(handlers::learning::get_learning_progress),
        )
        .route(
            "/api/learning/{course_id}/subtopics/{subtopic_id}/complete",
            post(handlers::learning::mark_subtopic_complete),
        )
        .route(
            "/api/learning/{course_id}/subtopics/{subtopic_id}/answer",
            post(handlers::learning::submit_subtopic_answer),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth,
        ));

    // Admin-only routes (auth + admin role)
    let admin_routes = Router::new()
        .route("/api/users/options", get(handlers::roles::user_options))
        .route(
            "/api/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route("/api/users/{username}", patch(handlers::admin::update_user))
        .route(
            "/api/users/{username}/reset-password",
            post(handlers::admin::reset_user_password),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth_admin,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(app_middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(
                    app_middleware::log_error_responses,
                ))
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(24 * 60 * 60));

    if config.cors_allow_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
