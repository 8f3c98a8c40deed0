//! Validate transaction requests into movements.

use serde::{Deserialize, Serialize};

/// Longest description accepted, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Direction {
    #[serde(rename = "c")]
    Credit,
    #[serde(rename = "d")]
    Debit,
}

impl Direction {
    pub fn is_credit(self) -> bool {
        self == Direction::Credit
    }

    pub fn from_credit_flag(is_credit: bool) -> Self {
        if is_credit {
            Direction::Credit
        } else {
            Direction::Debit
        }
    }
}

/// A transaction as sent by a client, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionRequest {
    pub amount: i64,
    pub direction: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTransaction {
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("the amount must be a positive integer, got {0}")]
    NonPositiveAmount(i64),
    #[error("the direction must be \"c\" or \"d\", got {0:?}")]
    UnknownDirection(String),
    #[error("the description must be 1 to {MAX_DESCRIPTION_LENGTH} characters long, got {0}")]
    DescriptionLength(usize),
}

/// A validated credit or debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    amount: i64,
    direction: Direction,
    description: String,
}

impl Movement {
    pub fn new(
        amount: i64,
        direction: Direction,
        description: impl Into<String>,
    ) -> Result<Self, InvalidTransaction> {
        if amount <= 0 {
            return Err(InvalidTransaction::NonPositiveAmount(amount));
        }
        let description = description.into();
        let length = description.chars().count();
        if length == 0 || length > MAX_DESCRIPTION_LENGTH {
            return Err(InvalidTransaction::DescriptionLength(length));
        }
        Ok(Movement {
            amount,
            direction,
            description,
        })
    }

    /// Always positive.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl TryFrom<TransactionRequest> for Movement {
    type Error = InvalidTransaction;

    fn try_from(request: TransactionRequest) -> Result<Self, Self::Error> {
        let direction = match request.direction.as_str() {
            "c" => Direction::Credit,
            "d" => Direction::Debit,
            _ => return Err(InvalidTransaction::UnknownDirection(request.direction)),
        };
        Movement::new(
            request.amount,
            direction,
            request.description.unwrap_or_default(),
        )
    }
}

impl std::str::FromStr for Movement {
    type Err = InvalidTransaction;

    /// Parse and validate a JSON request body.
    fn from_str(body: &str) -> Result<Self, Self::Err> {
        let request: TransactionRequest = serde_json::from_str(body)
            .map_err(|error| InvalidTransaction::Malformed(error.to_string()))?;
        Movement::try_from(request)
    }
}
