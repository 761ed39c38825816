//! SQLite case backend
//!
//! A single database file holds items, cluster runs, clusters with their
//! ordered members, endpoint statuses, and applied tags. Thread-safe via an
//! internal mutex on the connection.
//!
//! Deduplication collapses items sharing an MD5 digest, keeping the first in
//! input order; items without a digest (or unknown to the case) are unique by
//! GUID.

use super::fixture::CaseFixture;
use super::traits::{
    CaseError, CaseResult, CaseStore, Deduplicator, DescendantResolver, TagService,
};
use crate::cluster::{Cluster, ClusterId, ClusterKey, ClusterRun, ItemId};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Counts of rows written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub items: usize,
    pub cluster_runs: usize,
    pub clusters: usize,
    pub members: usize,
}

pub struct SqliteCase {
    conn: Mutex<Connection>,
}

impl SqliteCase {
    /// Open or create a case database at the given path
    pub fn open(path: impl AsRef<Path>) -> CaseResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory case (useful for testing)
    pub fn open_in_memory() -> CaseResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> CaseResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                guid TEXT PRIMARY KEY,
                name TEXT,
                md5 TEXT,
                parent_guid TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_items_parent
                ON items(parent_guid);

            CREATE TABLE IF NOT EXISTS cluster_runs (
                name TEXT PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS clusters (
                run TEXT NOT NULL,
                id INTEGER NOT NULL,
                PRIMARY KEY (run, id),
                FOREIGN KEY (run) REFERENCES cluster_runs(name) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS cluster_members (
                run TEXT NOT NULL,
                cluster_id INTEGER NOT NULL,
                item_guid TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (run, cluster_id, item_guid),
                FOREIGN KEY (run, cluster_id) REFERENCES clusters(run, id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS endpoint_statuses (
                item_guid TEXT NOT NULL,
                run TEXT NOT NULL,
                cluster_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (item_guid, run, cluster_id)
            );

            CREATE TABLE IF NOT EXISTS item_tags (
                item_guid TEXT NOT NULL,
                tag TEXT NOT NULL,
                PRIMARY KEY (item_guid, tag)
            );

            CREATE INDEX IF NOT EXISTS idx_item_tags_tag
                ON item_tags(tag);

            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> CaseResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CaseError::Service("case database lock poisoned".to_string()))
    }

    /// Load a fixture into the case in one transaction.
    ///
    /// Items are upserted. A run that already exists is rejected rather than
    /// merged.
    pub fn import(&self, fixture: &CaseFixture) -> CaseResult<ImportSummary> {
        fixture.validate()?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut summary = ImportSummary::default();

        for item in &fixture.items {
            tx.execute(
                "INSERT OR REPLACE INTO items (guid, name, md5, parent_guid)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    item.guid.as_str(),
                    item.name,
                    item.md5,
                    item.parent.as_ref().map(|p| p.as_str()),
                ],
            )?;
            summary.items += 1;
        }

        for run in &fixture.cluster_runs {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM cluster_runs WHERE name = ?1)",
                params![run.name],
                |row| row.get(0),
            )?;
            if exists {
                return Err(CaseError::InvalidFixture(format!(
                    "cluster run {} already exists",
                    run.name
                )));
            }
            tx.execute("INSERT INTO cluster_runs (name) VALUES (?1)", params![run.name])?;
            summary.cluster_runs += 1;

            for cluster in &run.clusters {
                tx.execute(
                    "INSERT INTO clusters (run, id) VALUES (?1, ?2)",
                    params![run.name, cluster.id.get()],
                )?;
                summary.clusters += 1;

                for (position, member) in cluster.members.iter().enumerate() {
                    tx.execute(
                        "INSERT OR IGNORE INTO items (guid) VALUES (?1)",
                        params![member.item.as_str()],
                    )?;
                    tx.execute(
                        "INSERT INTO cluster_members (run, cluster_id, item_guid, position)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![run.name, cluster.id.get(), member.item.as_str(), position as i64],
                    )?;
                    if let Some(status) = &member.status {
                        tx.execute(
                            "INSERT INTO endpoint_statuses (item_guid, run, cluster_id, status)
                             VALUES (?1, ?2, ?3, ?4)",
                            params![member.item.as_str(), run.name, cluster.id.get(), status],
                        )?;
                    }
                    summary.members += 1;
                }
            }
        }

        tx.commit()?;
        Ok(summary)
    }

    /// Labels applied to an item, sorted
    pub fn tags_for(&self, item: &ItemId) -> CaseResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT tag FROM item_tags WHERE item_guid = ?1 ORDER BY tag")?;
        let tags = stmt
            .query_map(params![item.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Items carrying a label, sorted by GUID
    pub fn items_tagged(&self, label: &str) -> CaseResult<Vec<ItemId>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT item_guid FROM item_tags WHERE tag = ?1 ORDER BY item_guid")?;
        let items = stmt
            .query_map(params![label], |row| row.get::<_, String>(0))?
            .map(|r| r.map(ItemId::from_string))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

impl CaseStore for SqliteCase {
    fn list_cluster_runs(&self) -> CaseResult<Vec<ClusterRun>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.name, (SELECT COUNT(*) FROM clusters c WHERE c.run = r.name)
             FROM cluster_runs r ORDER BY r.rowid",
        )?;
        let runs = stmt
            .query_map([], |row| {
                Ok(ClusterRun {
                    name: row.get(0)?,
                    cluster_count: row.get::<_, i64>(1)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    fn list_clusters(&self, run: &str) -> CaseResult<Vec<Cluster>> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cluster_runs WHERE name = ?1)",
            params![run],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(CaseError::ClusterRunNotFound(run.to_string()));
        }

        let mut stmt = conn.prepare("SELECT id FROM clusters WHERE run = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![run], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut members_stmt = conn.prepare(
            "SELECT item_guid FROM cluster_members
             WHERE run = ?1 AND cluster_id = ?2 ORDER BY position",
        )?;
        let mut clusters = Vec::with_capacity(ids.len());
        for id in ids {
            let members = members_stmt
                .query_map(params![run, id], |row| row.get::<_, String>(0))?
                .map(|r| r.map(ItemId::from_string))
                .collect::<Result<Vec<_>, _>>()?;
            clusters.push(Cluster::new(ClusterId::new(id), members));
        }
        Ok(clusters)
    }

    fn endpoint_status(&self, item: &ItemId, key: &ClusterKey) -> CaseResult<Option<String>> {
        let conn = self.conn()?;
        let status = conn
            .query_row(
                "SELECT status FROM endpoint_statuses
                 WHERE item_guid = ?1 AND run = ?2 AND cluster_id = ?3",
                params![item.as_str(), key.run(), key.cluster().get()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(status)
    }
}

impl DescendantResolver for SqliteCase {
    /// Depth-first over parent links, excluding the inputs themselves.
    fn find_descendants(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT guid FROM items WHERE parent_guid = ?1 ORDER BY rowid")?;
        let mut children_of = |guid: &str| -> CaseResult<Vec<String>> {
            let children = stmt
                .query_map(params![guid], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(children)
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut found = Vec::new();
        for root in items {
            let mut stack: Vec<String> = children_of(root.as_str())?;
            stack.reverse();
            while let Some(guid) = stack.pop() {
                if !seen.insert(guid.clone()) {
                    continue;
                }
                let mut children = children_of(&guid)?;
                children.reverse();
                stack.extend(children);
                found.push(ItemId::from_string(guid));
            }
        }
        Ok(found)
    }
}

impl Deduplicator for SqliteCase {
    fn deduplicate(&self, items: &[ItemId]) -> CaseResult<Vec<ItemId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT md5 FROM items WHERE guid = ?1")?;

        let mut digests: HashSet<String> = HashSet::new();
        let mut guids: HashSet<&ItemId> = HashSet::new();
        let mut unique = Vec::new();
        for item in items {
            let md5: Option<String> = stmt
                .query_row(params![item.as_str()], |row| row.get::<_, Option<String>>(0))
                .optional()?
                .flatten();
            let first = match md5 {
                Some(md5) => digests.insert(md5),
                None => guids.insert(item),
            };
            if first {
                unique.push(item.clone());
            }
        }
        Ok(unique)
    }
}

impl TagService for SqliteCase {
    fn apply_tag(&self, label: &str, items: &[ItemId]) -> CaseResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO item_tags (item_guid, tag) VALUES (?1, ?2)")?;
            for item in items {
                stmt.execute(params![item.as_str(), label])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
