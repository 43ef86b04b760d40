use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{
    health, news, persons, search, settings, soon, upload, users, visitors, works,
};
use crate::auth::login;
use crate::state::AppState;

/// Build the HTTP router with every `/api/v1` route.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_handler))
        // Auth and accounts
        .route("/auth/login", post(login::login_handler))
        .route(
            "/auth/me",
            get(login::me_handler).put(users::update_self_handler),
        )
        .route(
            "/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route("/users/delete-many", post(users::delete_many_users_handler))
        .route(
            "/users/{id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        // Search
        .route("/search", post(search::search_handler))
        // News
        .route(
            "/news",
            get(news::list_news_handler).post(news::create_news_handler),
        )
        .route("/news/delete-many", post(news::delete_many_news_handler))
        .route("/news/category/{category}", get(news::news_by_category_handler))
        .route(
            "/news/{id}",
            get(news::get_news_handler)
                .put(news::update_news_handler)
                .delete(news::delete_news_handler),
        )
        // Announcement
        .route(
            "/soon",
            get(soon::get_soon_handler).put(soon::put_soon_handler),
        )
        // Persons and works
        .route(
            "/persons",
            get(persons::list_persons_handler).post(persons::create_person_handler),
        )
        .route("/persons/basic", get(persons::list_basic_handler))
        .route("/persons/find", get(persons::find_persons_handler))
        .route(
            "/persons/delete-many",
            post(persons::delete_many_persons_handler),
        )
        .route(
            "/persons/{id}",
            get(persons::get_person_handler)
                .put(persons::update_person_handler)
                .delete(persons::delete_person_handler),
        )
        .route(
            "/works/{id}",
            get(works::get_work_handler)
                .put(works::update_work_handler)
                .delete(works::delete_work_handler),
        )
        .route("/media/{id}", delete(works::delete_media_handler))
        // Site settings
        .route(
            "/settings/theme",
            get(settings::get_theme_handler).put(settings::put_theme_handler),
        )
        .route(
            "/settings/text",
            get(settings::get_text_handler).put(settings::put_text_handler),
        )
        .route(
            "/settings/header",
            get(settings::get_header_handler).put(settings::put_header_handler),
        )
        .route(
            "/settings/footer",
            get(settings::get_footer_handler).put(settings::put_footer_handler),
        )
        // Visitors
        .route(
            "/visitors",
            get(visitors::list_visitors_handler).post(visitors::record_visit_handler),
        )
        .route("/visitors/total", get(visitors::total_visits_handler))
        .route(
            "/visitors/{id}",
            delete(visitors::delete_visitor_handler),
        )
        // Uploads
        .route(
            "/uploads",
            post(upload::upload_handler).layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES)),
        )
        .route("/uploads/{name}", get(upload::serve_upload_handler));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
