use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use catalog_products::ProductImageId;

use crate::app::routes::common::{self, Services};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_image))
        .route("/:id", get(get_image).patch(update_image).delete(delete_image))
        .route("/:id/upload", post(upload_image))
}

pub async fn create_image(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateImageRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let result = body.ordering().and_then(|ordering| {
        services.create_image(principal.owner(), body.product_line, &body.alt_text, ordering)
    });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn get_image(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    let id: ProductImageId = match errors::parse_id(&id, "image") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.get_image(principal.owner(), id))
}

pub async fn update_image(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateImageRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: ProductImageId = match errors::parse_id(&id, "image") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = body
        .into_patch()
        .and_then(|patch| services.update_image(principal.owner(), id, patch));
    errors::respond(StatusCode::OK, result)
}

/// Records the storage path for an uploaded payload; the bytes themselves
/// are handled by the storage front end.
pub async fn upload_image(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UploadImageRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: ProductImageId = match errors::parse_id(&id, "image") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        StatusCode::OK,
        services.upload_image(principal.owner(), id, &body.filename),
    )
}

pub async fn delete_image(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: ProductImageId = match errors::parse_id(&id, "image") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.delete_image(principal.owner(), id))
}
