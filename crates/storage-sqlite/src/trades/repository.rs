//! Repository for trade persistence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use super::model::TradeDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::trades;
use tradebook_core::errors::{DatabaseError, Error, Result};
use tradebook_core::trades::{Trade, TradeRepositoryTrait, TradeUpdate};

pub struct TradeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TradeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl TradeRepositoryTrait for TradeRepository {
    async fn save(&self, trade: Trade) -> Result<Trade> {
        self.writer
            .exec(move |conn| {
                let db_model: TradeDB = trade.clone().into();

                diesel::replace_into(trades::table)
                    .values(&db_model)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(trade)
            })
            .await
    }

    async fn update(&self, update: TradeUpdate) -> Result<Trade> {
        self.writer
            .exec(move |conn| {
                let existing = trades::table
                    .find(&update.id)
                    .first::<TradeDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                let db_model = existing.ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(format!("trade {}", update.id)))
                })?;

                let mut trade: Trade = db_model.try_into().map_err(Error::from)?;
                trade.apply_update(&update, Utc::now());

                let db_model: TradeDB = trade.clone().into();
                diesel::update(trades::table.find(&trade.id))
                    .set(&db_model)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(trade)
            })
            .await
    }

    fn get_by_id(&self, trade_id: &str) -> Result<Option<Trade>> {
        let mut conn = get_connection(&self.pool)?;

        let result = trades::table
            .find(trade_id)
            .first::<TradeDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        result.map(TryInto::try_into).transpose().map_err(Error::from)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Trade>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = trades::table
            .filter(trades::user_id.eq(user_id))
            .load::<TradeDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| row.try_into().map_err(Error::from))
            .collect()
    }

    async fn delete(&self, trade_id: &str) -> Result<()> {
        let trade_id = trade_id.to_string();
        self.writer
            .exec(move |conn| {
                // Deleting an absent id is a no-op by contract.
                diesel::delete(trades::table.find(&trade_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }

    async fn mark_synced(&self, trade_id: &str) -> Result<()> {
        let trade_id = trade_id.to_string();
        self.writer
            .exec(move |conn| {
                diesel::update(trades::table.find(&trade_id))
                    .set(trades::synced.eq(true))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(())
            })
            .await
    }
}
