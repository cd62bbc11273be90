use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use catalog_products::{ProductLineId, VariationId};

use crate::app::routes::common::{self, Services};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/:id",
            get(get_product_line).patch(update_product_line).delete(delete_product_line),
        )
        .route(
            "/:id/variations/:variation_id",
            post(link_variation).delete(unlink_variation),
        )
}

pub async fn get_product_line(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::read(&principal) {
        return resp;
    }
    let id: ProductLineId = match errors::parse_id(&id, "product line") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.get_product_line(principal.owner(), id))
}

pub async fn update_product_line(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductLineRequest>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: ProductLineId = match errors::parse_id(&id, "product line") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = body
        .into_patch()
        .and_then(|patch| services.update_product_line(principal.owner(), id, patch));
    errors::respond(StatusCode::OK, result)
}

pub async fn delete_product_line(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let id: ProductLineId = match errors::parse_id(&id, "product line") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.delete_product_line(principal.owner(), id))
}

pub async fn link_variation(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, variation_id)): Path<(String, String)>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let (id, variation): (ProductLineId, VariationId) =
        match (errors::parse_id(&id, "product line"), errors::parse_id(&variation_id, "variation")) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(resp), _) | (_, Err(resp)) => return resp,
        };
    errors::respond(
        StatusCode::CREATED,
        services.link_variation(principal.owner(), id, variation),
    )
}

pub async fn unlink_variation(
    Extension(services): Extension<Services>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, variation_id)): Path<(String, String)>,
) -> axum::response::Response {
    if let Err(resp) = common::write(&principal) {
        return resp;
    }
    let (id, variation): (ProductLineId, VariationId) =
        match (errors::parse_id(&id, "product line"), errors::parse_id(&variation_id, "variation")) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(resp), _) | (_, Err(resp)) => return resp,
        };
    match services.unlink_variation(principal.owner(), id, variation) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
