use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    In,
    Out,
    Adjustment,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::In => write!(f, "in"),
            TransactionType::Out => write!(f, "out"),
            TransactionType::Adjustment => write!(f, "adjustment"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" => Ok(TransactionType::In),
            "out" => Ok(TransactionType::Out),
            "adjustment" => Ok(TransactionType::Adjustment),
            _ => Err(format!(
                "Invalid transaction type '{}'. Valid options: in, out, adjustment",
                s
            )),
        }
    }
}

/// Direction of a manual correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Up,
    Down,
}

/// One entry of the append-only ledger.
///
/// `quantity` is always a magnitude. The sign comes from `kind`, or from
/// `change_direction` for adjustments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub item_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_direction: Option<ChangeDirection>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl Transaction {
    pub fn new(item_id: impl Into<String>, kind: TransactionType, quantity: i64) -> Self {
        Self {
            id: format!("t{}", Uuid::new_v4().simple()),
            item_id: item_id.into(),
            kind,
            quantity: quantity.abs(),
            change_direction: None,
            date: Utc::now(),
            notes: String::new(),
        }
    }

    /// Builds an adjustment from a signed delta.
    pub fn adjustment(item_id: impl Into<String>, delta: i64) -> Self {
        let direction = if delta > 0 {
            ChangeDirection::Up
        } else {
            ChangeDirection::Down
        };
        let mut transaction = Self::new(item_id, TransactionType::Adjustment, delta);
        transaction.change_direction = Some(direction);
        transaction
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Quantity counted as stock entering the warehouse.
    pub fn inbound(&self) -> i64 {
        match (self.kind, self.change_direction) {
            (TransactionType::In, _) => self.quantity,
            (TransactionType::Adjustment, Some(ChangeDirection::Up)) => self.quantity,
            _ => 0,
        }
    }

    /// Quantity counted as stock leaving the warehouse.
    pub fn outbound(&self) -> i64 {
        match (self.kind, self.change_direction) {
            (TransactionType::Out, _) => self.quantity,
            (TransactionType::Adjustment, Some(ChangeDirection::Down)) => self.quantity,
            _ => 0,
        }
    }

    /// Signed display form, e.g. `+5` or `-2`.
    pub fn signed_display(&self) -> String {
        let up = match self.kind {
            TransactionType::In => true,
            TransactionType::Out => false,
            TransactionType::Adjustment => self.change_direction == Some(ChangeDirection::Up),
        };
        format!("{}{}", if up { '+' } else { '-' }, self.quantity)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<10} {:>6}",
            self.date.format("%Y-%m-%d %H:%M"),
            self.kind,
            self.signed_display()
        )?;
        if !self.notes.is_empty() {
            write!(f, "  {}", self.notes)?;
        }
        Ok(())
    }
}
