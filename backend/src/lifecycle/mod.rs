//! Signature lifecycle: storage behind a repository trait and the manager that
//! enforces the default and quota rules on top of it.

pub mod context;
pub mod manager;
pub mod memory;
pub mod repository;
pub mod sqlite;

pub use context::UserContext;
pub use manager::SignatureManager;
pub use memory::InMemoryRepository;
pub use repository::SignatureRepository;
pub use sqlite::SqliteRepository;
