pub mod models;
pub mod mongo;
pub mod repository;
pub mod routes;
pub mod service;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

pub use models::{Book, BookFields};
pub use repository::{BookRepository, InMemoryBookRepository, StoreError};
pub use service::BookService;

/// The `books` resource: CRUD plus lookup by genre, mounted at `/books`
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self {
            service: Arc::new(BookService::new(repository)),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };
        let not_found = json!({
            "description": "Book not found",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/MessageResponse" } } }
        });
        let book = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Book" } } }
            })
        };
        let books = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                    }
                }
            })
        };
        let body = json!({
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookFields" } } }
        });
        let id_param = json!([{ "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": { "200": books("All books"), "500": error("Database failure") }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": body,
                        "responses": { "201": book("Created book"), "400": error("Validation failed") }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": { "200": book("The book"), "404": not_found, "400": error("Bad request") }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": body,
                        "responses": { "200": book("Updated book"), "404": not_found, "400": error("Validation failed") }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Deleted",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/MessageResponse" } } }
                            },
                            "404": not_found,
                            "400": error("Bad request")
                        }
                    }
                },
                "/genre/{genre}": {
                    "get": {
                        "summary": "List books in a genre",
                        "tags": ["Books"],
                        "parameters": [{ "name": "genre", "in": "path", "required": true, "schema": { "type": "string" } }],
                        "responses": { "200": books("Books whose genres include the given genre"), "400": error("Bad request") }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "ObjectId of the book" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "publishedYear": { "type": "integer", "minimum": 1900 },
                            "genres": { "type": "array", "items": { "type": "string" } },
                            "isAvailable": { "type": "boolean" }
                        },
                        "required": ["id", "title", "author", "genres", "isAvailable"]
                    },
                    "BookFields": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "publishedYear": { "type": "integer", "minimum": 1900 },
                            "genres": { "type": "array", "items": { "type": "string" } },
                            "isAvailable": { "type": "boolean", "default": true }
                        }
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.service.close().await?;
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}
