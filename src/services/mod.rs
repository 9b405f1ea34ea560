//! Business logic services

pub mod catalog;
pub mod collection;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub collection: collection::CollectionService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and catalog upstream
    pub fn new(
        repository: Repository,
        config: Arc<AppConfig>,
        catalog_client: Arc<dyn catalog::CatalogClient>,
    ) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), config.clone()),
            catalog: catalog::CatalogService::new(catalog_client, config.catalog.max_results),
            collection: collection::CollectionService::new(repository.clone()),
            repository,
        }
    }
}
