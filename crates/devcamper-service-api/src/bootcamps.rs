//! Bootcamp CRUD and radius search handlers.

use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use devcamper_lib::{Document, Fields};
use devcamper_service_shared::{
    list_filter, parse_record_id, record_records_returned, AppState, Envelope, ErrorReport,
    RadiusParams, Validate,
};

type HandlerResult<T> = Result<Envelope<T>, ErrorReport>;

/// `GET /api/v1/bootcamps`
pub async fn list_bootcamps(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> HandlerResult<Vec<Document>> {
    let Query(params) = query?;
    let bootcamps = state.bootcamps().list(list_filter(params)).await?;
    record_records_returned(bootcamps.len(), "list");
    Ok(Envelope::list(bootcamps))
}

/// `GET /api/v1/bootcamps/{id}`
pub async fn get_bootcamp(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> HandlerResult<Document> {
    let Path(id) = id?;
    let bootcamp = state.bootcamps().get(parse_record_id(&id)?).await?;
    Ok(Envelope::ok(bootcamp))
}

/// `POST /api/v1/bootcamps`
pub async fn create_bootcamp(
    State(state): State<AppState>,
    body: Result<Json<Fields>, JsonRejection>,
) -> HandlerResult<Document> {
    let Json(fields) = body?;
    let bootcamp = state.bootcamps().create(fields).await?;
    tracing::info!(id = %bootcamp.id, "bootcamp created");
    Ok(Envelope::created(bootcamp))
}

/// `PUT /api/v1/bootcamps/{id}`
pub async fn update_bootcamp(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<Fields>, JsonRejection>,
) -> HandlerResult<Document> {
    let Path(id) = id?;
    let id = parse_record_id(&id)?;
    let Json(fields) = body?;
    let bootcamp = state.bootcamps().update(id, fields).await?;
    Ok(Envelope::ok(bootcamp))
}

/// `DELETE /api/v1/bootcamps/{id}`, answering with an empty object.
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> HandlerResult<Fields> {
    let Path(id) = id?;
    let id = parse_record_id(&id)?;
    state.bootcamps().delete(id).await?;
    tracing::info!(%id, "bootcamp deleted");
    Ok(Envelope::ok(Fields::new()))
}

/// `GET /api/v1/bootcamps/radius/{zipcode}/{distance}`
pub async fn bootcamps_in_radius(
    State(state): State<AppState>,
    params: Result<Path<RadiusParams>, PathRejection>,
) -> HandlerResult<Vec<Document>> {
    let Path(params) = params?;
    params.validate()?;
    let miles = params.distance_miles()?;

    let bootcamps = state
        .bootcamps()
        .geo_search(state.geocoder(), params.zipcode.trim(), miles)
        .await?;
    record_records_returned(bootcamps.len(), "radius");
    Ok(Envelope::list(bootcamps))
}
