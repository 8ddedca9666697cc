//! Trade domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "LONG" => Some(Self::Long),
            "SHORT" => Some(Self::Short),
            _ => None,
        }
    }
}

/// Outcome of a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    Win,
    Loss,
    BreakEven,
}

impl TradeOutcome {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Loss => "LOSS",
            Self::BreakEven => "BREAK_EVEN",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "WIN" => Some(Self::Win),
            "LOSS" => Some(Self::Loss),
            "BREAK_EVEN" => Some(Self::BreakEven),
            _ => None,
        }
    }
}

/// Domain model for a journaled trade.
///
/// Mirrors the server entity shape plus local bookkeeping: `last_modified`
/// is stamped on every store mutation, and `synced` flips to true once the
/// corresponding queued mutation has been acknowledged remotely. The UI
/// never mutates these records directly, only through store operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub user_id: String,
    /// Traded symbol or contract (e.g. "AAPL", "ES").
    pub instrument: String,
    pub direction: TradeDirection,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub outcome: Option<TradeOutcome>,
    /// Setup/strategy tag from the journal checklist.
    pub setup: Option<String>,
    pub notes: Option<String>,
    pub last_modified: DateTime<Utc>,
    pub synced: bool,
}

impl Trade {
    /// Build a trade record from creation input.
    ///
    /// Stamps a fresh id, `last_modified = now`, and `synced = false`.
    pub fn from_new(new: NewTrade, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            instrument: new.instrument,
            direction: new.direction,
            quantity: new.quantity,
            entry_price: new.entry_price,
            exit_price: new.exit_price,
            entry_time: new.entry_time,
            exit_time: new.exit_time,
            outcome: new.outcome,
            setup: new.setup,
            notes: new.notes,
            last_modified: now,
            synced: false,
        }
    }

    /// Apply an update, stamping `last_modified` and clearing `synced`.
    pub fn apply_update(&mut self, update: &TradeUpdate, now: DateTime<Utc>) {
        if let Some(instrument) = &update.instrument {
            self.instrument = instrument.clone();
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(entry_price) = update.entry_price {
            self.entry_price = entry_price;
        }
        if let Some(exit_price) = update.exit_price {
            self.exit_price = Some(exit_price);
        }
        if let Some(exit_time) = update.exit_time {
            self.exit_time = Some(exit_time);
        }
        if let Some(outcome) = update.outcome {
            self.outcome = Some(outcome);
        }
        if let Some(setup) = &update.setup {
            self.setup = Some(setup.clone());
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        self.last_modified = now;
        self.synced = false;
    }
}

/// Input for creating a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub user_id: String,
    pub instrument: String,
    pub direction: TradeDirection,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub outcome: Option<TradeOutcome>,
    pub setup: Option<String>,
    pub notes: Option<String>,
}

/// Partial update of an existing trade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeUpdate {
    pub id: String,
    pub instrument: Option<String>,
    pub direction: Option<TradeDirection>,
    pub quantity: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub exit_time: Option<DateTime<Utc>>,
    pub outcome: Option<TradeOutcome>,
    pub setup: Option<String>,
    pub notes: Option<String>,
}

/// Read filters for the journal list.
#[derive(Debug, Clone, Default)]
pub struct TradeFilters {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub instrument: Option<String>,
    pub outcome: Option<TradeOutcome>,
}

impl TradeFilters {
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(from) = self.from {
            if trade.entry_time < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if trade.entry_time > to {
                return false;
            }
        }
        if let Some(instrument) = &self.instrument {
            if !trade.instrument.eq_ignore_ascii_case(instrument) {
                return false;
            }
        }
        if let Some(outcome) = self.outcome {
            if trade.outcome != Some(outcome) {
                return false;
            }
        }
        true
    }
}

/// Filter in memory and sort by entry time, newest first.
pub fn filter_and_sort(trades: Vec<Trade>, filters: &TradeFilters) -> Vec<Trade> {
    let mut result: Vec<Trade> = trades
        .into_iter()
        .filter(|trade| filters.matches(trade))
        .collect();
    result.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
    result
}
