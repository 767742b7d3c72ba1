//! Bookshelf application library
//!
//! The `books` module and the wiring that mounts it on the HTTP server.

pub mod modules;

pub use modules::*;

use std::sync::Arc;

use axum::Router;
use bookshelf_kernel::{settings::Settings, ModuleRegistry};

/// Registry holding every application module, backed by `books`
pub fn registry(books: Arc<dyn modules::books::BookRepository>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, books);
    registry
}

/// The complete HTTP application for `registry`
pub fn app(registry: &ModuleRegistry, settings: &Settings) -> Router {
    bookshelf_http::build_router(registry, settings)
}
