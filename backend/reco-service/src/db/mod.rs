/// Database access layer
///
/// Repositories over the users/items/interactions tables. Reads feed the
/// engine's catalog snapshots; writes come from the feedback endpoint.
pub mod catalog_repo;
pub mod interaction_repo;

pub use catalog_repo::CatalogRepo;
pub use interaction_repo::InteractionRepo;
