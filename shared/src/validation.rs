//! Validation utilities shared by the backend and the browser bindings
//!
//! Input structs declare their rules with `validator`; this module holds the
//! custom rules and the conversion of `ValidationErrors` into a single
//! field-level error the API can report.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::models::{MovementType, OrderStatus};

/// First validation failure of an input, reported against one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {message}")]
pub struct InputError {
    pub field: String,
    pub message: String,
}

impl InputError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationErrors> for InputError {
    fn from(errors: ValidationErrors) -> Self {
        first_error(&errors, None)
            .unwrap_or_else(|| InputError::new("body", "Invalid request body"))
    }
}

/// Walk nested errors in a stable (sorted) order and report the first one
fn first_error(errors: &ValidationErrors, prefix: Option<&str>) -> Option<InputError> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(name, _)| **name);

    for (name, kind) in fields {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, name),
            None => name.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                if let Some(err) = errs.first() {
                    return Some(InputError::new(path, describe(name, err)));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_error(inner, Some(&path)) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let item_path = format!("{}[{}]", path, index);
                    if let Some(found) = first_error(inner, Some(&item_path)) {
                        return Some(found);
                    }
                }
            }
        }
    }

    None
}

fn describe(field: &str, err: &ValidationError) -> String {
    match &err.message {
        Some(message) => message.to_string(),
        None if err.code == "required" => format!("{} is required", field),
        None => format!("{} is invalid", field),
    }
}

/// Unwrap a field that `#[validate(required)]` has already checked
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, InputError> {
    value.ok_or_else(|| InputError::new(field, format!("{} is required", field)))
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

// ============================================================================
// Custom rules
// ============================================================================

/// Largest value a `NUMERIC(12, 2)` price column holds (9999999999.99)
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Largest value a `NUMERIC(14, 2)` order total holds (999999999999.99)
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

/// Prices are stored with two decimal places
fn check_price_precision(price: &Decimal) -> Result<(), ValidationError> {
    if price.normalize().scale() > 2 {
        return Err(rule("price_scale", "price cannot have more than 2 decimal places"));
    }
    if *price > MAX_PRICE {
        return Err(rule("price_range", "price cannot exceed 9999999999.99"));
    }
    Ok(())
}

/// Unit prices on order lines must be strictly positive
pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(rule("positive_price", "unit_price must be greater than zero"));
    }
    check_price_precision(price)
}

/// Catalog prices may be zero but never negative
pub fn validate_non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(rule("non_negative_price", "price cannot be negative"));
    }
    check_price_precision(price)
}

pub fn validate_order_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<OrderStatus>()
        .map(|_| ())
        .map_err(|_| rule("order_status", "Status must be: pending, received, or cancelled"))
}

pub fn validate_movement_type(kind: &str) -> Result<(), ValidationError> {
    kind.parse::<MovementType>()
        .map(|_| ())
        .map_err(|_| rule("movement_type", "type must be 'in' or 'out'"))
}

/// Reject names that are empty once trimmed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("blank", "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1, message = "quantity must be greater than zero"))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Body {
        #[validate(required)]
        name: Option<String>,
        #[validate]
        lines: Vec<Line>,
    }

    #[test]
    fn test_missing_field_is_reported_by_name() {
        let body = Body {
            name: None,
            lines: vec![],
        };
        let err = InputError::from(body.validate().unwrap_err());
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_nested_error_carries_index() {
        let body = Body {
            name: Some("bolts".to_string()),
            lines: vec![Line { quantity: 2 }, Line { quantity: 0 }],
        };
        let err = InputError::from(body.validate().unwrap_err());
        assert_eq!(err.field, "lines[1].quantity");
        assert_eq!(err.message, "quantity must be greater than zero");
    }

    #[test]
    fn test_price_rules() {
        assert!(validate_positive_price(&Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_positive_price(&Decimal::ZERO).is_err());
        assert!(validate_non_negative_price(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_price(&Decimal::from_str("-1").unwrap()).is_err());
    }

    #[test]
    fn test_price_precision_matches_storage() {
        let dec = |s: &str| Decimal::from_str(s).unwrap();

        assert!(validate_positive_price(&dec("1.50")).is_ok());
        assert!(validate_positive_price(&dec("1.500")).is_ok());
        assert_eq!(validate_positive_price(&dec("0.005")).unwrap_err().code, "price_scale");
        assert_eq!(validate_non_negative_price(&dec("2.125")).unwrap_err().code, "price_scale");

        assert!(validate_positive_price(&MAX_PRICE).is_ok());
        assert_eq!(MAX_PRICE, dec("9999999999.99"));
        assert_eq!(MAX_ORDER_TOTAL, dec("999999999999.99"));
        assert_eq!(validate_positive_price(&dec("10000000000")).unwrap_err().code, "price_range");
        assert_eq!(validate_non_negative_price(&dec("100000000000000000000")).unwrap_err().code, "price_range");
    }

    #[test]
    fn test_enum_rules() {
        assert!(validate_order_status("cancelled").is_ok());
        assert!(validate_order_status("CANCELLED").is_err());
        assert!(validate_movement_type("out").is_ok());
        assert!(validate_movement_type("sideways").is_err());
    }

    #[test]
    fn test_blank_names() {
        assert!(validate_not_blank("Pallet jack").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
