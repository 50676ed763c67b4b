//! Structural snapshot of the live schema, read from SQLite's catalog pragmas.
//!
//! Two snapshots compare equal when tables, columns, indexes and foreign keys
//! match, regardless of how the `CREATE` text was spelled.

use super::SqlitePool;
use crate::error::StayError;
use sqlx::FromRow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ColumnShape {
    pub name: String,
    #[sqlx(rename = "type")]
    pub data_type: String,
    #[sqlx(rename = "notnull")]
    pub not_null: bool,
    #[sqlx(rename = "dflt_value")]
    pub default: Option<String>,
    #[sqlx(rename = "pk")]
    pub primary_key: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexShape {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ForeignKeyShape {
    pub from: String,
    pub table: String,
    pub to: Option<String>,
    pub on_update: String,
    pub on_delete: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableShape {
    pub columns: Vec<ColumnShape>,
    pub indexes: Vec<IndexShape>,
    pub foreign_keys: Vec<ForeignKeyShape>,
}

impl TableShape {
    pub fn column(&self, name: &str) -> Option<&ColumnShape> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_key(&self, from: &str) -> Option<&ForeignKeyShape> {
        self.foreign_keys.iter().find(|fk| fk.from == from)
    }

    pub fn index(&self, name: &str) -> Option<&IndexShape> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Unique indexes, including the implicit ones behind UNIQUE constraints.
    pub fn unique_column_sets(&self) -> Vec<&[String]> {
        self.indexes
            .iter()
            .filter(|i| i.unique)
            .map(|i| i.columns.as_slice())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaSnapshot {
    pub tables: BTreeMap<String, TableShape>,
}

impl SchemaSnapshot {
    /// Capture every user table; SQLite internals and the migration ledger are skipped.
    pub async fn capture(pool: &SqlitePool) -> Result<Self, StayError> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"SELECT name FROM sqlite_master
               WHERE type = 'table'
                 AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
                 AND name NOT LIKE '\_schema\_%' ESCAPE '\'
               ORDER BY name"#,
        )
        .fetch_all(pool)
        .await?;

        let mut tables = BTreeMap::new();
        for (name,) in names {
            let shape = Self::table_shape(pool, &name).await?;
            tables.insert(name, shape);
        }
        Ok(Self { tables })
    }

    async fn table_shape(pool: &SqlitePool, table: &str) -> Result<TableShape, StayError> {
        let columns = sqlx::query_as::<_, ColumnShape>(
            r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid"#,
        )
        .bind(table)
        .fetch_all(pool)
        .await?;

        let foreign_keys = sqlx::query_as::<_, ForeignKeyShape>(
            r#"SELECT "from", "table", "to", on_update, on_delete
               FROM pragma_foreign_key_list(?) ORDER BY id, seq"#,
        )
        .bind(table)
        .fetch_all(pool)
        .await?;

        let index_rows: Vec<(String, bool)> = sqlx::query_as(
            r#"SELECT name, "unique" FROM pragma_index_list(?) ORDER BY name"#,
        )
        .bind(table)
        .fetch_all(pool)
        .await?;

        let mut indexes = Vec::with_capacity(index_rows.len());
        for (name, unique) in index_rows {
            let columns: Vec<(String,)> =
                sqlx::query_as("SELECT name FROM pragma_index_info(?) ORDER BY seqno")
                    .bind(&name)
                    .fetch_all(pool)
                    .await?;
            indexes.push(IndexShape {
                name,
                unique,
                columns: columns.into_iter().map(|(c,)| c).collect(),
            });
        }

        Ok(TableShape {
            columns,
            indexes,
            foreign_keys,
        })
    }

    pub fn table(&self, name: &str) -> Option<&TableShape> {
        self.tables.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }
}
