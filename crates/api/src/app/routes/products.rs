use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
};

use crate::app::routes::common::{self, Services};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:slug", get(get_product).patch(update_product).delete(delete_product))
        .route("/:slug/lines", post(create_product_line))
}

pub async fn create_product(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    errors::respond(
        StatusCode::CREATED,
        services.create_product(principal.owner(), body.into()),
    )
}

/// `?category=` matches by name or slug and includes sub-categories.
pub async fn list_products(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ProductListQuery>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    let filter = query.into();
    errors::respond(StatusCode::OK, Ok(services.list_products(principal.owner(), &filter)))
}

pub async fn get_product(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    errors::respond(StatusCode::OK, services.get_product(principal.owner(), &slug))
}

pub async fn update_product(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(slug): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    errors::respond(
        StatusCode::OK,
        services.update_product(principal.owner(), &slug, body.into()),
    )
}

pub async fn delete_product(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    errors::respond(StatusCode::OK, services.delete_product(principal.owner(), &slug))
}

pub async fn create_product_line(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(slug): Path<String>,
    Json(body): Json<dto::CreateProductLineRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let owner = principal.owner();
    let result = services.product_by_slug(owner, &slug).and_then(|product| {
        let new = body.into_new()?;
        services.create_product_line(owner, product.id, new)
    });
    errors::respond(StatusCode::CREATED, result)
}
