use axum::{Router, routing::get};

pub mod attributes;
pub mod brands;
pub mod categories;
pub mod common;
pub mod images;
pub mod product_lines;
pub mod products;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints: the caller's own profile and the
/// owner-scoped catalog.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/users/me", get(users::me).patch(users::update_me).delete(users::delete_me))
        .nest("/categories", categories::router())
        .nest("/brands", brands::router())
        .nest("/products", products::router())
        .nest("/product-lines", product_lines::router())
        .nest("/images", images::router())
        .nest("/attributes", attributes::router())
}
