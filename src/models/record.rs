use rust_decimal::Decimal;

/// A single debt entry: `friend` owes `owner` the signed `amount`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Option<i64>,
    pub owner: i64,
    pub amount: Decimal,
    pub friend: String,
    pub desc: String,
    pub created_at: String,
}

impl Record {
    pub fn new(owner: i64, friend: String, amount: Decimal, desc: String) -> Self {
        Self {
            id: None,
            owner,
            amount,
            friend,
            desc,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The `YYYY-MM-DD` part of the creation timestamp.
    pub fn created_date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }

    /// Sum of the amounts of `records`, or `None` if it overflows.
    pub fn total(records: &[Record]) -> Option<Decimal> {
        records
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.amount))
    }
}
