pub mod account_service;
pub mod catalog_loader;
pub mod session_store;

pub use account_service::AccountService;
pub use catalog_loader::{CatalogLoader, CatalogReport};
pub use session_store::SessionStore;
