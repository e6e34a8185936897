//! PostgreSQL configuration store.

use super::models::{ConfigRow, NewConfigRow, guild_from_db, to_db_id};
use super::schema::guild_configs;
use super::{PgPool, with_connection};
use crate::{ConfigStore, ConfigWrite, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use herald_core::{GuildConfig, GuildId};
use herald_error::StoreError;
use tracing::{debug, instrument};

/// Guild configurations stored as JSONB documents, one row per guild.
#[derive(Debug, Clone)]
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    /// Store using `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn load(conn: &mut PgConnection, guild: i64, lock: bool) -> StoreResult<Option<GuildConfig>> {
    let query = guild_configs::table
        .filter(guild_configs::guild_id.eq(guild))
        .select(ConfigRow::as_select());
    let row = if lock {
        query.for_update().first(conn).optional()?
    } else {
        query.first(conn).optional()?
    };
    row.map(|r| GuildConfig::from_document(r.document).map_err(StoreError::from))
        .transpose()
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildConfig>> {
        let guild = to_db_id(guild_id.get())?;
        with_connection(&self.pool, move |conn| load(conn, guild, false)).await
    }

    #[instrument(skip(self, write), fields(guild_id = %guild_id))]
    async fn save(&self, guild_id: GuildId, write: ConfigWrite) -> StoreResult<GuildConfig> {
        let guild = to_db_id(guild_id.get())?;
        with_connection(&self.pool, move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let current = match &write {
                    ConfigWrite::Replace(_) => None,
                    ConfigWrite::Merge(_) => load(conn, guild, true)?,
                };
                let config = write.apply(current);
                let document = serde_json::to_value(&config)?;
                let now = Utc::now();

                diesel::insert_into(guild_configs::table)
                    .values(&NewConfigRow {
                        guild_id: guild,
                        document: document.clone(),
                        updated_at: now,
                    })
                    .on_conflict(guild_configs::guild_id)
                    .do_update()
                    .set((
                        guild_configs::document.eq(&document),
                        guild_configs::updated_at.eq(now),
                    ))
                    .execute(conn)?;

                debug!("Guild configuration saved");
                Ok(config)
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> StoreResult<Vec<(GuildId, GuildConfig)>> {
        with_connection(&self.pool, |conn| {
            let rows = guild_configs::table
                .select(ConfigRow::as_select())
                .load(conn)?;
            debug!(count = rows.len(), "Loaded guild configurations");
            rows.into_iter()
                .map(|row| -> StoreResult<(GuildId, GuildConfig)> {
                    Ok((
                        guild_from_db(row.guild_id)?,
                        GuildConfig::from_document(row.document)?,
                    ))
                })
                .collect()
        })
        .await
    }
}
