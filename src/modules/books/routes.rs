use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use bookshelf_http::ApiError;

use super::{
    models::{Book, BookFields},
    repository::StoreError,
    service::BookService,
};

type AppState = Arc<BookService>;

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => ApiError::validation(errors.to_string()),
            StoreError::NotFound => ApiError::not_found(StoreError::NotFound.to_string()),
            // Write paths and lookups report database failures as client errors.
            StoreError::Backend(message) => ApiError::bad_request(message),
        }
    }
}

/// A request without a JSON content type carries no fields.
fn fields_or_empty(
    payload: Result<Json<BookFields>, JsonRejection>,
) -> Result<BookFields, ApiError> {
    match payload {
        Ok(Json(fields)) => Ok(fields),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(BookFields::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/genre/{genre}", get(books_by_genre))
        .with_state(service)
}

async fn create_book(
    State(service): State<AppState>,
    payload: Result<Json<BookFields>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = service.create(fields_or_empty(payload)?).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(State(service): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    match service.list().await {
        Ok(books) => Ok(Json(books)),
        Err(StoreError::Backend(message)) => Err(ApiError::Internal(anyhow::anyhow!(message))),
        Err(other) => Err(other.into()),
    }
}

async fn get_book(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(service.get_by_id(&id).await?))
}

async fn update_book(
    State(service): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BookFields>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(service.update(&id, fields_or_empty(payload)?).await?))
}

async fn delete_book(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let book = service.delete(&id).await?;
    Ok(Json(json!({
        "message": format!("Book '{}' deleted successfully.", book.title)
    })))
}

async fn books_by_genre(
    State(service): State<AppState>,
    Path(genre): Path<String>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(service.find_by_genre(&genre).await?))
}
