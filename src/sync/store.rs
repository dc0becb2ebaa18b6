use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::sync::error::StorageError;
use crate::sync::storage::{StorageGateway, Table};
use crate::sync::types::{Champion, ChampionSkin, Realm, SkinId};

/// Schema version stored in `user_version`.
/// A mismatch in either direction drops and recreates the mirror tables.
const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS realm (
        realm_version TEXT NOT NULL PRIMARY KEY,
        cdn TEXT NOT NULL,
        champion_version TEXT NOT NULL,
        summoner_version TEXT NOT NULL,
        language_version TEXT NOT NULL,
        map_version TEXT NOT NULL,
        item_version TEXT NOT NULL,
        mastery_version TEXT NOT NULL,
        rune_version TEXT NOT NULL,
        profile_icon_version TEXT NOT NULL,
        profile_icon_max INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS champion (
        id INTEGER NOT NULL PRIMARY KEY,
        name TEXT NOT NULL,
        title TEXT NOT NULL,
        blurb TEXT NOT NULL,
        key TEXT NOT NULL,
        image_url TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS champion_idx_01 ON champion(name)",
    r#"
    CREATE TABLE IF NOT EXISTS champion_skin (
        skin_id INTEGER NOT NULL,
        champion_id INTEGER NOT NULL,
        skin_number INTEGER NOT NULL,
        name TEXT NOT NULL,
        portrait_image_url TEXT NOT NULL,
        landscape_image_url TEXT NOT NULL,
        PRIMARY KEY (skin_id, skin_number)
    )
    "#,
];

/// SQLite-backed mirror of the static data
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        info!("Opening mirror database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.prepare_schema()?;
        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn prepare_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock_conn()?;
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if current_version != 0 && current_version != SCHEMA_VERSION {
            info!(
                "Schema version changed from v{} to v{}, recreating tables",
                current_version, SCHEMA_VERSION
            );
            for table in Table::RESET_ORDER {
                conn.execute(&format!("DROP TABLE IF EXISTS {}", table.as_str()), [])?;
            }
        }

        for sql in CREATE_TABLES {
            conn.execute(sql, [])?;
        }

        if current_version != SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        debug!("Database schema ready at v{}", SCHEMA_VERSION);
        Ok(())
    }

    /// Stored realm row, if any
    pub fn realm(&self) -> Result<Option<Realm>, StorageError> {
        let conn = self.lock_conn()?;
        let realm = conn
            .query_row(
                r#"
                SELECT realm_version, cdn, champion_version, summoner_version, language_version,
                       map_version, item_version, mastery_version, rune_version,
                       profile_icon_version, profile_icon_max
                FROM realm LIMIT 1
                "#,
                [],
                |row| {
                    Ok(Realm {
                        realm_version: row.get(0)?,
                        cdn: row.get(1)?,
                        champion_version: row.get(2)?,
                        summoner_version: row.get(3)?,
                        language_version: row.get(4)?,
                        map_version: row.get(5)?,
                        item_version: row.get(6)?,
                        mastery_version: row.get(7)?,
                        rune_version: row.get(8)?,
                        profile_icon_version: row.get(9)?,
                        profile_icon_max: row.get(10)?,
                    })
                },
            )
            .optional()?;

        Ok(realm)
    }

    /// All champions ordered by name
    pub fn champions(&self) -> Result<Vec<Champion>, StorageError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, key, name, title, blurb, image_url FROM champion ORDER BY name",
        )?;

        let champions = stmt
            .query_map([], |row| {
                Ok(Champion {
                    id: row.get(0)?,
                    key: row.get(1)?,
                    name: row.get(2)?,
                    title: row.get(3)?,
                    blurb: row.get(4)?,
                    image_url: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(champions)
    }

    /// Skins of one champion ordered by skin number
    pub fn skins_for(&self, champion_id: i64) -> Result<Vec<ChampionSkin>, StorageError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT skin_id, champion_id, skin_number, name, portrait_image_url, landscape_image_url
            FROM champion_skin WHERE champion_id = ?1 ORDER BY skin_number
            "#,
        )?;

        let skins = stmt
            .query_map([champion_id], |row| {
                Ok(ChampionSkin {
                    skin_id: row.get(0)?,
                    champion_id: row.get(1)?,
                    skin_number: row.get(2)?,
                    name: row.get(3)?,
                    portrait_image_url: row.get(4)?,
                    landscape_image_url: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(skins)
    }
}

impl StorageGateway for SqliteStore {
    fn local_realm_version(&self) -> Result<Option<String>, StorageError> {
        let conn = self.lock_conn()?;
        let version = conn
            .query_row("SELECT realm_version FROM realm LIMIT 1", [], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;

        match &version {
            Some(v) => debug!("Found local realm version {}", v),
            None => debug!("No local realm version found"),
        }
        Ok(version)
    }

    fn delete_all(&self, table: Table) -> Result<usize, StorageError> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(&format!("DELETE FROM {}", table.as_str()), [])?;
        info!("Deleted {} row(s) from the {} table", deleted, table.as_str());
        Ok(deleted)
    }

    fn insert_realm(&self, realm: &Realm) -> Result<String, StorageError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO realm (
                realm_version, cdn, champion_version, summoner_version, language_version,
                map_version, item_version, mastery_version, rune_version,
                profile_icon_version, profile_icon_max
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            (
                &realm.realm_version,
                &realm.cdn,
                &realm.champion_version,
                &realm.summoner_version,
                &realm.language_version,
                &realm.map_version,
                &realm.item_version,
                &realm.mastery_version,
                &realm.rune_version,
                &realm.profile_icon_version,
                realm.profile_icon_max,
            ),
        )?;
        Ok(realm.realm_version.clone())
    }

    fn insert_champion(&self, champion: &Champion) -> Result<i64, StorageError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO champion (id, name, title, blurb, key, image_url) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                champion.id,
                &champion.name,
                &champion.title,
                &champion.blurb,
                &champion.key,
                &champion.image_url,
            ),
        )?;
        Ok(champion.id)
    }

    fn insert_skin(&self, skin: &ChampionSkin) -> Result<SkinId, StorageError> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO champion_skin (
                skin_id, champion_id, skin_number, name, portrait_image_url, landscape_image_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            (
                skin.skin_id,
                skin.champion_id,
                skin.skin_number,
                &skin.name,
                &skin.portrait_image_url,
                &skin.landscape_image_url,
            ),
        )?;
        Ok(SkinId {
            skin_id: skin.skin_id,
            skin_number: skin.skin_number,
        })
    }

    fn count(&self, table: Table) -> Result<usize, StorageError> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.as_str()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
