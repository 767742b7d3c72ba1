pub mod books;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, books: Arc<dyn books::BookRepository>) {
    registry.register(Arc::new(books::BooksModule::new(books)));
}
