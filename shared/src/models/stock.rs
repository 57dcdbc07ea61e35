//! Stock ledger models and the on-hand quantity rules

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::validation::{required, validate_movement_type, InputError};

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
        }
    }

    /// Signed delta for a positive quantity moving in this direction
    pub fn signed(&self, quantity: i32) -> i32 {
        match self {
            MovementType::In => quantity,
            MovementType::Out => -quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            _ => Err(InputError::new("type", "type must be 'in' or 'out'")),
        }
    }
}

/// What caused a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Order,
    Manual,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Order => "order",
            ReferenceType::Manual => "manual",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(ReferenceType::Order),
            "manual" => Ok(ReferenceType::Manual),
            _ => Err(InputError::new(
                "reference_type",
                "reference_type must be 'order' or 'manual'",
            )),
        }
    }
}

/// How a negative delta that overshoots the on-hand quantity is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorPolicy {
    /// Floor the result at zero (order cancellation reversal).
    Clamp,
    /// Refuse the change (manual `out` adjustment).
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Insufficient stock: {available} on hand, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Quantity overflow")]
    Overflow,
}

/// Compute the on-hand quantity after applying `delta` to `current`
pub fn apply_delta(current: i32, delta: i32, policy: FloorPolicy) -> Result<i32, StockError> {
    let next = current.checked_add(delta).ok_or(StockError::Overflow)?;
    if next >= 0 {
        return Ok(next);
    }

    match policy {
        FloorPolicy::Clamp => Ok(0),
        FloorPolicy::Reject => Err(StockError::InsufficientStock {
            available: current,
            requested: delta.saturating_neg(),
        }),
    }
}

/// Body of `POST /stock-movements`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ManualAdjustmentInput {
    #[validate(required, range(min = 1, message = "product_id is required"))]
    pub product_id: Option<i64>,

    #[serde(rename = "type")]
    #[validate(required, custom = "validate_movement_type")]
    pub movement_type: Option<String>,

    #[validate(required, range(min = 1, message = "quantity must be greater than zero"))]
    pub quantity: Option<i32>,

    #[validate(length(max = 255, message = "reason must be at most 255 characters"))]
    pub reason: Option<String>,
}

/// A validated manual adjustment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAdjustment {
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: String,
}

impl ManualAdjustment {
    pub const DEFAULT_REASON: &'static str = "Manual adjustment";

    pub fn delta(&self) -> i32 {
        self.movement_type.signed(self.quantity)
    }
}

impl ManualAdjustmentInput {
    pub fn parse(self) -> Result<ManualAdjustment, InputError> {
        self.validate()?;

        let reason = self
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| ManualAdjustment::DEFAULT_REASON.to_string());

        Ok(ManualAdjustment {
            product_id: required(self.product_id, "product_id")?,
            movement_type: required(self.movement_type, "type")?.parse()?,
            quantity: required(self.quantity, "quantity")?,
            reason,
        })
    }
}
