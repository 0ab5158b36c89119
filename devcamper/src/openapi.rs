use axum::Json;
use utoipa::OpenApi;

use crate::auth::Role;
use crate::filtering::{PageRef, Pagination};
use crate::models::{
    BootcampCreate, BootcampUpdate, CourseCreate, CourseUpdate, ReviewCreate, ReviewUpdate, UserCreate, UserUpdate,
};
use crate::results::AdvancedResults;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DevCamper API",
        description = "Directory of coding bootcamps with their courses and reviews. List routes accept \
                       filters (`field=value`, `field[gt|gte|lt|lte|in]=value`), `select`, `sort`, `page` and `limit`.",
    ),
    components(schemas(
        AdvancedResults,
        Pagination,
        PageRef,
        Role,
        BootcampCreate,
        BootcampUpdate,
        CourseCreate,
        CourseUpdate,
        ReviewCreate,
        ReviewUpdate,
        UserCreate,
        UserUpdate,
    )),
    tags(
        (name = "bootcamps", description = "Bootcamps and their computed averages"),
        (name = "courses", description = "Courses offered by a bootcamp"),
        (name = "reviews", description = "User reviews of a bootcamp"),
        (name = "users", description = "User administration"),
    )
)]
pub struct ApiDoc;

/// `GET /openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_envelope_schema() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &doc["components"]["schemas"];
        for name in ["AdvancedResults", "Pagination", "BootcampCreate", "UserCreate"] {
            assert!(schemas.get(name).is_some(), "{name}");
        }
    }
}
