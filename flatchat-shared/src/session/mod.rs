/// Client-side session state
///
/// # Modules
///
/// - [`storage`]: `StorageBackend` trait with file and in-memory backends
/// - [`store`]: `SessionStore`, the single owner of the session record

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use store::SessionStore;
