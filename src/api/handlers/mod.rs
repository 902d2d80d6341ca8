use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    Json,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::API_PREFIX;
use crate::db::Database;
use crate::error::{Error, ErrorKind};
use crate::models::*;
use crate::service::{MinionService, ParentService};

type HandlerError = (StatusCode, String);
type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

// ============================================================
// Error Handling
// ============================================================

/// Map a core failure onto a status code.
///
/// Client errors carry their message. Store failures are logged in full
/// server-side and the client only sees a generic message.
fn error_response(e: Error) -> HandlerError {
    let status = match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidInput | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::Store | ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if e.is_client_error() {
        tracing::warn!("Rejected request: {}", e);
        return (status, e.to_string());
    }

    tracing::error!("Internal error: {}", e);
    (status, "Internal server error".to_string())
}

/// Path of a single record, with the name encoded as one path segment.
fn location(kind: &str, name: Option<&str>) -> String {
    let name = utf8_percent_encode(name.unwrap_or_default(), NON_ALPHANUMERIC);
    format!("{}/{}/{}", API_PREFIX, kind, name)
}

fn created<T>(location: String, element: T) -> Created<T> {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(element),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Parents
// ============================================================

pub async fn list_parents(
    State(db): State<Database>,
) -> Result<Json<Vec<Parent>>, HandlerError> {
    let session = db.session().map_err(error_response)?;
    ParentService::new()
        .get(&session, None)
        .map(Json)
        .map_err(error_response)
}

pub async fn get_parent(
    State(db): State<Database>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Parent>>, HandlerError> {
    let session = db.session().map_err(error_response)?;
    ParentService::new()
        .get(&session, Some(&name))
        .map(Json)
        .map_err(error_response)
}

pub async fn create_parent(
    State(db): State<Database>,
    Json(input): Json<Parent>,
) -> Result<Created<Parent>, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    let parent = ParentService::new()
        .create(&mut session, input)
        .map_err(error_response)?;
    let location = location("Parent", parent.name.as_deref());
    Ok(created(location, parent))
}

pub async fn update_parent(
    State(db): State<Database>,
    Path(name): Path<String>,
    Json(input): Json<Parent>,
) -> Result<Json<Parent>, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    ParentService::new()
        .update(&mut session, &name, input)
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_all_parents(
    State(db): State<Database>,
) -> Result<StatusCode, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    ParentService::new()
        .delete(&mut session, None)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

pub async fn delete_parent(
    State(db): State<Database>,
    Path(name): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    ParentService::new()
        .delete(&mut session, Some(&name))
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

// ============================================================
// Minions
// ============================================================

pub async fn list_minions(
    State(db): State<Database>,
) -> Result<Json<Vec<Minion>>, HandlerError> {
    let session = db.session().map_err(error_response)?;
    MinionService::new()
        .get(&session, None)
        .map(Json)
        .map_err(error_response)
}

pub async fn get_minion(
    State(db): State<Database>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Minion>>, HandlerError> {
    let session = db.session().map_err(error_response)?;
    MinionService::new()
        .get(&session, Some(&name))
        .map(Json)
        .map_err(error_response)
}

pub async fn create_minion(
    State(db): State<Database>,
    Json(input): Json<Minion>,
) -> Result<Created<Minion>, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    let minion = MinionService::new()
        .create(&mut session, input)
        .map_err(error_response)?;
    let location = location("Minion", minion.name.as_deref());
    Ok(created(location, minion))
}

pub async fn update_minion(
    State(db): State<Database>,
    Path(name): Path<String>,
    Json(input): Json<Minion>,
) -> Result<Json<Minion>, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    MinionService::new()
        .update(&mut session, &name, input)
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_all_minions(
    State(db): State<Database>,
) -> Result<StatusCode, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    MinionService::new()
        .delete(&mut session, None)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

pub async fn delete_minion(
    State(db): State<Database>,
    Path(name): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let mut session = db.session().map_err(error_response)?;
    MinionService::new()
        .delete(&mut session, Some(&name))
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_encodes_name_segment() {
        assert_eq!(location("Parent", Some("P1")), "/api/v1/Parent/P1");
        assert_eq!(
            location("Parent", Some("test parent")),
            "/api/v1/Parent/test%20parent"
        );
        assert_eq!(location("Minion", Some("a/b")), "/api/v1/Minion/a%2Fb");
    }

    #[test]
    fn test_location_is_a_valid_header_for_control_characters() {
        let location = location("Parent", Some("line\nbreak"));
        assert_eq!(location, "/api/v1/Parent/line%0Abreak");
        assert!(axum::http::HeaderValue::from_str(&location).is_ok());
    }
}
