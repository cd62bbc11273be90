use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use catalog_products::AttributeId;

use crate::app::routes::common::{self, Services};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_attributes).post(create_attribute))
        .route(
            "/:id",
            get(get_attribute).patch(update_attribute).delete(delete_attribute),
        )
}

pub async fn create_attribute(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateAttributeRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    errors::respond(
        StatusCode::CREATED,
        services.create_attribute(principal.owner(), body.into()),
    )
}

pub async fn list_attributes(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    errors::respond(StatusCode::OK, Ok(services.list_attributes(principal.owner())))
}

pub async fn get_attribute(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    let id: AttributeId = match errors::parse_id(&id, "attribute") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.get_attribute(principal.owner(), id))
}

/// With `variations`, the attribute's variations are replaced wholesale.
pub async fn update_attribute(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateAttributeRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: AttributeId = match errors::parse_id(&id, "attribute") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        StatusCode::OK,
        services.update_attribute(principal.owner(), id, body.into()),
    )
}

pub async fn delete_attribute(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: AttributeId = match errors::parse_id(&id, "attribute") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.delete_attribute(principal.owner(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
