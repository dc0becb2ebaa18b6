//! Remote data source trait for fetching realm and champion documents

#[cfg(test)]
use mockall::automock;

use crate::sync::error::RemoteError;
use crate::sync::types::{ChampionDocument, RealmDocument};

/// Extra champion fields requested alongside the base record
pub const CHAMP_DATA: &str = "blurb,skins";

/// Trait for fetching static data documents from a remote source
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RemoteDataSource: Send + Sync {
    /// Fetches the current realm document
    async fn get_realm(&self) -> Result<RealmDocument, RemoteError>;

    /// Fetches every champion
    ///
    /// # Arguments
    /// * `champ_data` - Comma separated extra fields, e.g. "blurb,skins"
    async fn get_champions(&self, champ_data: &str) -> Result<ChampionDocument, RemoteError>;
}
