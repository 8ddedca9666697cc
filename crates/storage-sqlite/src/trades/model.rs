//! Database model for trades.

use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{format_utc, parse_decimal, parse_decimal_opt, parse_utc, parse_utc_opt};
use tradebook_core::trades::{Trade, TradeDirection, TradeOutcome};

/// Database model for a journaled trade.
#[derive(Queryable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeDB {
    pub id: String,
    pub user_id: String,
    pub instrument: String,
    pub direction: String,
    pub quantity: String,
    pub entry_price: String,
    pub exit_price: Option<String>,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub outcome: Option<String>,
    pub setup: Option<String>,
    pub notes: Option<String>,
    pub last_modified: String,
    pub synced: bool,
}

impl From<Trade> for TradeDB {
    fn from(trade: Trade) -> Self {
        Self {
            id: trade.id,
            user_id: trade.user_id,
            instrument: trade.instrument,
            direction: trade.direction.as_db_str().to_string(),
            quantity: trade.quantity.to_string(),
            entry_price: trade.entry_price.to_string(),
            exit_price: trade.exit_price.map(|p| p.to_string()),
            entry_time: format_utc(trade.entry_time),
            exit_time: trade.exit_time.map(format_utc),
            outcome: trade.outcome.map(|o| o.as_db_str().to_string()),
            setup: trade.setup,
            notes: trade.notes,
            last_modified: format_utc(trade.last_modified),
            synced: trade.synced,
        }
    }
}

impl TryFrom<TradeDB> for Trade {
    type Error = StorageError;

    fn try_from(db: TradeDB) -> Result<Self, Self::Error> {
        let direction = TradeDirection::from_db_str(&db.direction).ok_or_else(|| {
            StorageError::SerializationError(format!("unknown trade direction '{}'", db.direction))
        })?;
        let outcome = db
            .outcome
            .as_deref()
            .map(|o| {
                TradeOutcome::from_db_str(o).ok_or_else(|| {
                    StorageError::SerializationError(format!("unknown trade outcome '{o}'"))
                })
            })
            .transpose()?;

        Ok(Self {
            direction,
            outcome,
            quantity: parse_decimal(&db.quantity)?,
            entry_price: parse_decimal(&db.entry_price)?,
            exit_price: parse_decimal_opt(db.exit_price.as_deref())?,
            entry_time: parse_utc(&db.entry_time)?,
            exit_time: parse_utc_opt(db.exit_time.as_deref())?,
            last_modified: parse_utc(&db.last_modified)?,
            id: db.id,
            user_id: db.user_id,
            instrument: db.instrument,
            setup: db.setup,
            notes: db.notes,
            synced: db.synced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tradebook_core::trades::NewTrade;

    #[test]
    fn test_trade_round_trips_through_db_model() {
        let now = Utc::now();
        let trade = Trade::from_new(
            NewTrade {
                user_id: "u1".to_string(),
                instrument: "ES".to_string(),
                direction: TradeDirection::Short,
                quantity: dec!(3),
                entry_price: dec!(4512.75),
                exit_price: Some(dec!(4498.50)),
                entry_time: now,
                exit_time: Some(now),
                outcome: Some(TradeOutcome::Win),
                setup: Some("fade".to_string()),
                notes: None,
            },
            now,
        );

        let db: TradeDB = trade.clone().into();
        let restored: Trade = db.try_into().unwrap();

        assert_eq!(restored.id, trade.id);
        assert_eq!(restored.direction, TradeDirection::Short);
        assert_eq!(restored.quantity, dec!(3));
        assert_eq!(restored.exit_price, Some(dec!(4498.50)));
        assert_eq!(restored.outcome, Some(TradeOutcome::Win));
        assert!(!restored.synced);
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let now = Utc::now();
        let trade = Trade::from_new(
            NewTrade {
                user_id: "u1".to_string(),
                instrument: "ES".to_string(),
                direction: TradeDirection::Long,
                quantity: dec!(1),
                entry_price: dec!(1),
                exit_price: None,
                entry_time: now,
                exit_time: None,
                outcome: None,
                setup: None,
                notes: None,
            },
            now,
        );

        let mut db: TradeDB = trade.into();
        db.direction = "SIDEWAYS".to_string();

        assert!(Trade::try_from(db).is_err());
    }
}
