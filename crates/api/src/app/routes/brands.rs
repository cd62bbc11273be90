use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};

use catalog_products::BrandId;

use crate::app::routes::common::{self, Services};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/:id", get(get_brand).patch(update_brand).delete(delete_brand))
}

pub async fn create_brand(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateBrandRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    errors::respond(
        StatusCode::CREATED,
        services.create_brand(principal.owner(), &body.name, body.is_active),
    )
}

pub async fn list_brands(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    errors::respond(StatusCode::OK, Ok(services.list_brands(principal.owner())))
}

pub async fn get_brand(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    let id: BrandId = match errors::parse_id(&id, "brand") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.get_brand(principal.owner(), id))
}

pub async fn update_brand(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateBrandRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: BrandId = match errors::parse_id(&id, "brand") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.update_brand(principal.owner(), id, body.into()))
}

pub async fn delete_brand(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: BrandId = match errors::parse_id(&id, "brand") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.delete_brand(principal.owner(), id))
}
