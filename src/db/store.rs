//! Transactional store over the service database.
//!
//! A [`Store`] owns at most one live SQLite connection. Every operation except
//! [`Store::connect`] and [`Store::disconnect`] fails with [`AgentError::NotConnected`]
//! until `connect` succeeds. Every write runs inside one transaction; an early return drops
//! the transaction, which rolls it back.

use crate::db::models::{DbModel, DbResource, ModelCreate, ResourceCreate};
use crate::db::schema::{SCHEMA_VERSIONS, SQLITE_INIT};
use crate::error::AgentError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::{Connection, SqliteConnection};
use std::{str::FromStr, time::Duration};
use tracing::{debug, warn};

/// Which model rows a lookup selects, decoded from the wire's version argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSelector {
    /// `0`: every version, ordered by version.
    All,
    /// `-1`: the single active version.
    Active,
    Version(u32),
}

impl TryFrom<i64> for ModelSelector {
    type Error = AgentError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(ModelSelector::All),
            -1 => Ok(ModelSelector::Active),
            v if v > 0 => u32::try_from(v)
                .map(ModelSelector::Version)
                .map_err(|_| AgentError::invalid_argument(format!("model version {v} out of range"))),
            v => Err(AgentError::invalid_argument(format!(
                "model version {v} is not a valid selector"
            ))),
        }
    }
}

pub struct Store {
    options: SqliteConnectOptions,
    key_prefix: String,
    conn: Option<SqliteConnection>,
}

impl Store {
    pub fn new(database_url: &str, key_prefix: impl Into<String>) -> Result<Self, AgentError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        Ok(Self {
            options,
            key_prefix: key_prefix.into(),
            conn: None,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Opens the database and makes sure the schema exists. No-op when already connected.
    pub async fn connect(&mut self) -> Result<(), AgentError> {
        if self.conn.is_some() {
            return Ok(());
        }

        let mut conn = SqliteConnection::connect_with(&self.options).await?;
        apply_schema(&mut conn).await?;
        self.conn = Some(conn);
        debug!("store connected");
        Ok(())
    }

    /// Closes the connection if one is open.
    pub async fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close().await {
                warn!(error = %e, "store close failed; connection dropped");
            } else {
                debug!("store disconnected");
            }
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.key_prefix, name)
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection, AgentError> {
        self.conn.as_mut().ok_or(AgentError::NotConnected)
    }

    pub async fn set_pipeline(&mut self, name: &str, description: &str) -> Result<(), AgentError> {
        require(name, "pipeline name")?;
        require(description, "pipeline description")?;
        let key = self.key(name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO pipelines (name, description)
            VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET description = excluded.description
            "#,
        )
        .bind(&key)
        .bind(description)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(name, "pipeline stored");
        Ok(())
    }

    pub async fn get_pipeline(&mut self, name: &str) -> Result<String, AgentError> {
        require(name, "pipeline name")?;
        let key = self.key(name);
        let conn = self.conn()?;

        sqlx::query_scalar::<_, String>("SELECT description FROM pipelines WHERE name = ?")
            .bind(&key)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AgentError::not_found(format!("no pipeline named {name}")))
    }

    pub async fn delete_pipeline(&mut self, name: &str) -> Result<(), AgentError> {
        require(name, "pipeline name")?;
        let key = self.key(name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        let affected = sqlx::query("DELETE FROM pipelines WHERE name = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(AgentError::not_found(format!("no pipeline named {name}")));
        }
        tx.commit().await?;

        debug!(name, affected, "pipeline deleted");
        Ok(())
    }

    /// Inserts a new model version and returns it. The version is `max + 1` for the name, or
    /// `1` for a new name, computed by the insert statement itself.
    pub async fn register_model(&mut self, create: ModelCreate) -> Result<u32, AgentError> {
        require(&create.name, "model name")?;
        require(&create.path, "model path")?;
        let key = self.key(&create.name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        if create.active {
            sqlx::query("UPDATE models SET active = 0 WHERE name = ? AND active = 1")
                .bind(&key)
                .execute(&mut *tx)
                .await?;
        }

        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO models (name, version, active, path, description, app_info)
            SELECT ?, COALESCE(MAX(version), 0) + 1, ?, ?, ?, ?
            FROM models
            WHERE name = ?
            RETURNING version
            "#,
        )
        .bind(&key)
        .bind(create.active)
        .bind(&create.path)
        .bind(&create.description)
        .bind(&create.app_info)
        .bind(&key)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        let version = u32::try_from(version)
            .map_err(|_| AgentError::InvalidState(format!("model version {version} overflowed")))?;
        debug!(name = %create.name, version, active = create.active, "model registered");
        Ok(version)
    }

    pub async fn update_model_description(
        &mut self,
        name: &str,
        version: u32,
        description: &str,
    ) -> Result<(), AgentError> {
        require(name, "model name")?;
        require(description, "model description")?;
        require_version(version)?;
        let key = self.key(name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        let affected = sqlx::query("UPDATE models SET description = ? WHERE name = ? AND version = ?")
            .bind(description)
            .bind(&key)
            .bind(i64::from(version))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(AgentError::not_found(format!("no model {name} version {version}")));
        }
        tx.commit().await?;

        debug!(name, version, "model description updated");
        Ok(())
    }

    /// Makes `version` the only active version of `name`.
    pub async fn activate_model(&mut self, name: &str, version: u32) -> Result<(), AgentError> {
        require(name, "model name")?;
        require_version(version)?;
        let key = self.key(name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT version FROM models WHERE name = ? AND version = ?")
                .bind(&key)
                .bind(i64::from(version))
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AgentError::not_found(format!("no model {name} version {version}")));
        }

        sqlx::query("UPDATE models SET active = 0 WHERE name = ? AND active = 1")
            .bind(&key)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE models SET active = 1 WHERE name = ? AND version = ?")
            .bind(&key)
            .bind(i64::from(version))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(name, version, "model activated");
        Ok(())
    }

    /// Returns the selected rows. `All` yields every version ordered by version; the other
    /// selectors yield exactly one row or `NotFound`.
    pub async fn get_model(
        &mut self,
        name: &str,
        selector: ModelSelector,
    ) -> Result<Vec<DbModel>, AgentError> {
        require(name, "model name")?;
        let key = self.key(name);
        let conn = self.conn()?;

        let rows = match selector {
            ModelSelector::All => {
                sqlx::query_as::<_, DbModel>(
                    r#"
                    SELECT version, active, path, description, app_info
                    FROM models
                    WHERE name = ?
                    ORDER BY version
                    "#,
                )
                .bind(&key)
                .fetch_all(&mut *conn)
                .await?
            }
            ModelSelector::Active => {
                sqlx::query_as::<_, DbModel>(
                    r#"
                    SELECT version, active, path, description, app_info
                    FROM models
                    WHERE name = ? AND active = 1
                    "#,
                )
                .bind(&key)
                .fetch_all(&mut *conn)
                .await?
            }
            ModelSelector::Version(version) => {
                sqlx::query_as::<_, DbModel>(
                    r#"
                    SELECT version, active, path, description, app_info
                    FROM models
                    WHERE name = ? AND version = ?
                    "#,
                )
                .bind(&key)
                .bind(i64::from(version))
                .fetch_all(&mut *conn)
                .await?
            }
        };

        if rows.is_empty() {
            let what = match selector {
                ModelSelector::All => format!("no model named {name}"),
                ModelSelector::Active => format!("no active version of model {name}"),
                ModelSelector::Version(v) => format!("no model {name} version {v}"),
            };
            return Err(AgentError::not_found(what));
        }
        Ok(rows)
    }

    /// Deletes one version, or every version when `version` is 0.
    ///
    /// A single active version is only deleted with `force`; deleting every version never
    /// checks activeness.
    pub async fn delete_model(
        &mut self,
        name: &str,
        version: u32,
        force: bool,
    ) -> Result<(), AgentError> {
        require(name, "model name")?;
        let key = self.key(name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        let affected = if version == 0 {
            sqlx::query("DELETE FROM models WHERE name = ?")
                .bind(&key)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        } else {
            let active: Option<bool> =
                sqlx::query_scalar("SELECT active FROM models WHERE name = ? AND version = ?")
                    .bind(&key)
                    .bind(i64::from(version))
                    .fetch_optional(&mut *tx)
                    .await?;
            match active {
                None => 0,
                Some(true) if !force => {
                    return Err(AgentError::InvalidState(format!(
                        "model {name} version {version} is active; activate another version first"
                    )));
                }
                Some(_) => sqlx::query("DELETE FROM models WHERE name = ? AND version = ?")
                    .bind(&key)
                    .bind(i64::from(version))
                    .execute(&mut *tx)
                    .await?
                    .rows_affected(),
            }
        };

        if affected == 0 {
            let what = if version == 0 {
                format!("no model named {name}")
            } else {
                format!("no model {name} version {version}")
            };
            return Err(AgentError::not_found(what));
        }
        tx.commit().await?;

        debug!(name, version, force, affected, "model deleted");
        Ok(())
    }

    /// Adds a file to a resource. Re-adding an existing path refreshes its metadata and
    /// keeps its position.
    pub async fn set_resource(&mut self, create: ResourceCreate) -> Result<(), AgentError> {
        require(&create.name, "resource name")?;
        require(&create.path, "resource path")?;
        let key = self.key(&create.name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO resources (name, path, description, app_info)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name, path) DO UPDATE SET
                description = excluded.description,
                app_info = excluded.app_info
            "#,
        )
        .bind(&key)
        .bind(&create.path)
        .bind(&create.description)
        .bind(&create.app_info)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(name = %create.name, path = %create.path, "resource stored");
        Ok(())
    }

    /// Returns every file of a resource, oldest first.
    pub async fn get_resource(&mut self, name: &str) -> Result<Vec<DbResource>, AgentError> {
        require(name, "resource name")?;
        let key = self.key(name);
        let conn = self.conn()?;

        let rows = sqlx::query_as::<_, DbResource>(
            r#"
            SELECT id, path, description, app_info
            FROM resources
            WHERE name = ?
            ORDER BY id
            "#,
        )
        .bind(&key)
        .fetch_all(&mut *conn)
        .await?;

        if rows.is_empty() {
            return Err(AgentError::not_found(format!("no resource named {name}")));
        }
        Ok(rows)
    }

    pub async fn delete_resource(&mut self, name: &str) -> Result<(), AgentError> {
        require(name, "resource name")?;
        let key = self.key(name);
        let conn = self.conn()?;

        let mut tx = conn.begin().await?;
        let affected = sqlx::query("DELETE FROM resources WHERE name = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(AgentError::not_found(format!("no resource named {name}")));
        }
        tx.commit().await?;

        debug!(name, affected, "resource deleted");
        Ok(())
    }
}

pub(crate) fn require(value: &str, what: &str) -> Result<(), AgentError> {
    if value.is_empty() {
        return Err(AgentError::invalid_argument(format!("{what} must not be empty")));
    }
    Ok(())
}

pub(crate) fn require_version(version: u32) -> Result<(), AgentError> {
    if version == 0 {
        return Err(AgentError::invalid_argument("model version must be positive"));
    }
    Ok(())
}

async fn apply_schema(conn: &mut SqliteConnection) -> Result<(), AgentError> {
    let mut tx = conn.begin().await?;
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(&mut *tx).await?;
    }

    for &(table, supported) in SCHEMA_VERSIONS {
        sqlx::query("INSERT OR IGNORE INTO schema_info (name, version) VALUES (?, ?)")
            .bind(table)
            .bind(supported)
            .execute(&mut *tx)
            .await?;
        let stored: i64 = sqlx::query_scalar("SELECT version FROM schema_info WHERE name = ?")
            .bind(table)
            .fetch_one(&mut *tx)
            .await?;
        if stored != supported {
            return Err(AgentError::SchemaMismatch {
                table: table.to_string(),
                stored,
                supported,
            });
        }
    }
    tx.commit().await?;
    Ok(())
}
