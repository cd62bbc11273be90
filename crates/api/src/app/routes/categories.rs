use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
};

use catalog_products::CategoryId;

use crate::app::routes::common::{self, Services};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", get(get_category).patch(update_category).delete(delete_category))
        .route("/:id/descendants", get(descendants))
}

pub async fn create_category(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    errors::respond(
        StatusCode::CREATED,
        services.create_category(principal.owner(), body.into()),
    )
}

pub async fn list_categories(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    errors::respond(StatusCode::OK, Ok(services.list_categories(principal.owner())))
}

pub async fn get_category(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    let id: CategoryId = match errors::parse_id(&id, "category") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.get_category(principal.owner(), id))
}

pub async fn update_category(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCategoryRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: CategoryId = match errors::parse_id(&id, "category") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        StatusCode::OK,
        services.update_category(principal.owner(), id, body.into()),
    )
}

pub async fn delete_category(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: CategoryId = match errors::parse_id(&id, "category") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = services.delete_category(principal.owner(), id).map(|deleted| {
        serde_json::json!({
            "id": deleted.removed.id,
            "orphaned": deleted.orphaned,
        })
    });
    errors::respond(StatusCode::OK, result)
}

pub async fn descendants(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<dto::DescendantsQuery>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    let id: CategoryId = match errors::parse_id(&id, "category") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        StatusCode::OK,
        services.category_descendants(principal.owner(), id, query.include_self),
    )
}
