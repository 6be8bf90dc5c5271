//! People API handlers
//!
//! Person-centric read path: the people listing with detection totals, the
//! cached per-person detection history, and the rename operation that
//! invalidates it.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use facewatch_common::db::Person;
use serde::{Deserialize, Serialize};

use crate::db::people;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PageQuery};
use crate::services::aggregator::DetectionPage;
use crate::AppState;

/// One row of the people listing
#[derive(Debug, Serialize)]
pub struct PersonSummary {
    #[serde(flatten)]
    pub person: Person,
    pub total_detections: i64,
}

/// GET /api/people response
#[derive(Debug, Serialize)]
pub struct PeopleResponse {
    pub data: Vec<PersonSummary>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

/// PATCH /api/people/:id/name request
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// PATCH /api/people/:id/name response
#[derive(Debug, Serialize)]
pub struct RenameResponse {
    pub success: bool,
    pub person: Person,
}

/// GET /api/people
///
/// People newest-first with combined detection totals. The totals repeat
/// the photo meta scan for every listed person - O(people x photos).
pub async fn list_people(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PeopleResponse>> {
    let everyone = people::load_people(&state.db).await?;

    let p = calculate_pagination(everyone.len() as i64, query.page, query.per_page);

    let page: Vec<Person> = everyone
        .into_iter()
        .skip(p.offset as usize)
        .take(p.per_page as usize)
        .collect();

    let mut data = Vec::with_capacity(page.len());
    for person in page {
        let total_detections = state.aggregator.total_for_person(person.id).await?;
        data.push(PersonSummary {
            person,
            total_detections,
        });
    }

    Ok(Json(PeopleResponse {
        data,
        current_page: p.page,
        per_page: p.per_page,
        total: p.total,
        last_page: p.last_page,
    }))
}

/// GET /api/people/:id/detections
///
/// Cached, paginated cross-modal detection history, newest first.
pub async fn person_detections(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<DetectionPage>> {
    people::load_person(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Person {} not found", id)))?;

    let page = state
        .aggregator
        .list_detections(id, query.page, query.per_page)
        .await?;

    Ok(Json(page))
}

/// PATCH /api/people/:id/name
///
/// Rename a person and orphan their cached detection pages.
pub async fn rename_person(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RenameRequest>,
) -> ApiResult<Json<RenameResponse>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    if name.len() > 255 {
        return Err(ApiError::BadRequest(
            "name must be at most 255 characters".to_string(),
        ));
    }

    let person = people::update_person_name(&state.db, id, name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Person {} not found", id)))?;

    state.aggregator.invalidate_person(id).await;

    Ok(Json(RenameResponse {
        success: true,
        person,
    }))
}

/// Build people routes
pub fn people_routes() -> Router<AppState> {
    Router::new()
        .route("/api/people", get(list_people))
        .route("/api/people/:id/detections", get(person_detections))
        .route("/api/people/:id/name", patch(rename_person))
}
