//! LoRA 触发词目录

mod config;
pub use config::{CatalogConfig, CATALOG_FILENAME, CATALOG_PATH_ENV, PREFERRED_CATALOG_PATH};

mod context;
pub use context::CatalogContext;

mod store;
pub use store::{CatalogEntry, LoraCatalog};
