//! Storage gateway used by the sync pipeline

#[cfg(test)]
use mockall::automock;

use crate::sync::error::StorageError;
use crate::sync::types::{Champion, ChampionSkin, Realm, SkinId};

/// Tables owned by the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Realm,
    Champion,
    ChampionSkin,
}

impl Table {
    /// Deletion order used when resetting the mirror (children first)
    pub const RESET_ORDER: [Table; 3] = [Table::ChampionSkin, Table::Champion, Table::Realm];

    /// Returns the SQL table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Realm => "realm",
            Table::Champion => "champion",
            Table::ChampionSkin => "champion_skin",
        }
    }
}

/// Typed access to the local mirror.
///
/// Implementations are synchronous; the orchestrator runs every call on the
/// blocking pool so that a single connection acts as the only writer.
#[cfg_attr(test, automock)]
pub trait StorageGateway: Send + Sync + 'static {
    /// Realm version of the stored realm row, if any
    fn local_realm_version(&self) -> Result<Option<String>, StorageError>;

    /// Delete every row of a table, returning the number of rows removed
    fn delete_all(&self, table: Table) -> Result<usize, StorageError>;

    /// Insert the realm row, returning its realm version
    fn insert_realm(&self, realm: &Realm) -> Result<String, StorageError>;

    /// Insert a champion row, returning its id
    fn insert_champion(&self, champion: &Champion) -> Result<i64, StorageError>;

    /// Insert a champion skin row, returning its key
    fn insert_skin(&self, skin: &ChampionSkin) -> Result<SkinId, StorageError>;

    /// Number of rows in a table
    fn count(&self, table: Table) -> Result<usize, StorageError>;
}
