//! Long-lived state shared by the game sessions: the catalog cache and the
//! token lifecycle with its persistent store.

mod auth;
mod catalog;
mod token_store;

pub use auth::TokenLifecycleManager;
pub use catalog::CatalogCache;
pub use token_store::FileTokenStore;
pub use token_store::PersistentTokenStore;
