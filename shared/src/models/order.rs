//! Purchase order models and the status transition table

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{
    required, validate_order_status, validate_positive_price, InputError, MAX_ORDER_TOTAL,
};

/// Lifecycle status of a purchase order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Received,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Received,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Received => "received",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "received" => Ok(OrderStatus::Received),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(InputError::new(
                "status",
                "Status must be: pending, received, or cancelled",
            )),
        }
    }
}

/// Stock side effect implied by moving an order between two statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPlan {
    /// Requested status equals the stored one; nothing is written.
    Unchanged,
    /// Status is rewritten, inventory is untouched.
    StatusOnly,
    /// Every line item is credited to stock with an `in` movement.
    ReceiveStock,
    /// Every line item is debited (floored at zero) with an `out` movement.
    ReverseStock,
}

impl TransitionPlan {
    pub fn touches_stock(&self) -> bool {
        matches!(self, TransitionPlan::ReceiveStock | TransitionPlan::ReverseStock)
    }

    /// `received -> pending` and every exit from `cancelled` have no defined
    /// business rule and fall back to a bare overwrite.
    pub fn is_undefined_rule(current: OrderStatus, requested: OrderStatus) -> bool {
        matches!(
            (current, requested),
            (OrderStatus::Received, OrderStatus::Pending)
                | (OrderStatus::Cancelled, OrderStatus::Pending)
                | (OrderStatus::Cancelled, OrderStatus::Received)
        )
    }
}

/// Decide what a transition from `current` to `requested` does to inventory
pub fn plan_transition(current: OrderStatus, requested: OrderStatus) -> TransitionPlan {
    use OrderStatus::*;

    match (current, requested) {
        (a, b) if a == b => TransitionPlan::Unchanged,
        (Pending, Received) => TransitionPlan::ReceiveStock,
        (Received, Cancelled) => TransitionPlan::ReverseStock,
        (Pending, Cancelled) => TransitionPlan::StatusOnly,
        // received -> pending, cancelled -> *
        _ => TransitionPlan::StatusOnly,
    }
}

/// Ledger reason written for each line item of a stock-moving transition
pub fn transition_reason(order_id: i64, plan: TransitionPlan) -> Option<String> {
    match plan {
        TransitionPlan::ReceiveStock => Some(format!("Order #{} received", order_id)),
        TransitionPlan::ReverseStock => {
            Some(format!("Order #{} cancelled — stock reversed", order_id))
        }
        TransitionPlan::Unchanged | TransitionPlan::StatusOnly => None,
    }
}

/// Body of `PATCH /orders/:id/status`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusChangeInput {
    #[validate(required, custom = "validate_order_status")]
    pub status: Option<String>,
}

impl StatusChangeInput {
    pub fn parse(self) -> Result<OrderStatus, InputError> {
        self.validate()?;
        required(self.status, "status")?.parse()
    }
}

/// One requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(required, range(min = 1, message = "product_id must be a positive id"))]
    pub product_id: Option<i64>,

    #[validate(required, range(min = 1, message = "quantity must be greater than zero"))]
    pub quantity: Option<i32>,

    #[validate(required, custom = "validate_positive_price")]
    pub unit_price: Option<Decimal>,
}

impl OrderItemInput {
    pub fn parse(self) -> Result<OrderLineDraft, InputError> {
        self.validate()?;
        Ok(OrderLineDraft {
            product_id: required(self.product_id, "product_id")?,
            quantity: required(self.quantity, "quantity")?,
            unit_price: required(self.unit_price, "unit_price")?,
        })
    }
}

/// Body of `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(required, range(min = 1, message = "supplier_id is required"))]
    pub supplier_id: Option<i64>,

    #[validate(length(min = 1, message = "Order must have at least one item"))]
    #[validate]
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// A validated order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineDraft {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLineDraft {
    /// `None` when the product does not fit in a `Decimal`
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// A validated order ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub supplier_id: i64,
    pub items: Vec<OrderLineDraft>,
    pub total_amount: Decimal,
}

impl CreateOrderInput {
    pub fn parse(self) -> Result<OrderDraft, InputError> {
        self.validate()?;

        let supplier_id = required(self.supplier_id, "supplier_id")?;
        let items = self
            .items
            .into_iter()
            .map(OrderItemInput::parse)
            .collect::<Result<Vec<_>, InputError>>()?;

        Ok(OrderDraft {
            supplier_id,
            total_amount: order_total(&items)?,
            items,
        })
    }
}

/// Sum of quantity × unit price over all lines, bounded by what an order
/// total column can store
pub fn order_total(items: &[OrderLineDraft]) -> Result<Decimal, InputError> {
    let total = items.iter().try_fold(Decimal::ZERO, |acc, line| {
        line.line_total().and_then(|amount| acc.checked_add(amount))
    });

    match total {
        Some(total) if total <= MAX_ORDER_TOTAL => Ok(total),
        _ => Err(InputError::new(
            "items",
            "Order total cannot exceed 999999999999.99",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_same_status_is_unchanged() {
        for status in OrderStatus::ALL {
            assert_eq!(plan_transition(status, status), TransitionPlan::Unchanged);
        }
    }

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;

        assert_eq!(plan_transition(Pending, Received), TransitionPlan::ReceiveStock);
        assert_eq!(plan_transition(Pending, Cancelled), TransitionPlan::StatusOnly);
        assert_eq!(plan_transition(Received, Cancelled), TransitionPlan::ReverseStock);
        assert_eq!(plan_transition(Received, Pending), TransitionPlan::StatusOnly);
        assert_eq!(plan_transition(Cancelled, Pending), TransitionPlan::StatusOnly);
        assert_eq!(plan_transition(Cancelled, Received), TransitionPlan::StatusOnly);
    }

    #[test]
    fn test_undefined_rules_are_flagged() {
        use OrderStatus::*;

        assert!(TransitionPlan::is_undefined_rule(Received, Pending));
        assert!(TransitionPlan::is_undefined_rule(Cancelled, Received));
        assert!(!TransitionPlan::is_undefined_rule(Pending, Received));
        assert!(!TransitionPlan::is_undefined_rule(Received, Cancelled));
    }

    #[test]
    fn test_transition_reason() {
        assert_eq!(
            transition_reason(7, TransitionPlan::ReceiveStock).as_deref(),
            Some("Order #7 received")
        );
        assert_eq!(
            transition_reason(7, TransitionPlan::ReverseStock).as_deref(),
            Some("Order #7 cancelled — stock reversed")
        );
        assert_eq!(transition_reason(7, TransitionPlan::StatusOnly), None);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("received".parse::<OrderStatus>().unwrap(), OrderStatus::Received);
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.field, "status");
    }

    #[test]
    fn test_status_change_input_rejects_unknown_value() {
        let input = StatusChangeInput {
            status: Some("archived".to_string()),
        };
        assert_eq!(input.parse().unwrap_err().field, "status");

        let missing = StatusChangeInput { status: None };
        assert_eq!(missing.parse().unwrap_err().field, "status");
    }

    #[test]
    fn test_create_order_computes_total() {
        let input = CreateOrderInput {
            supplier_id: Some(1),
            items: vec![
                OrderItemInput {
                    product_id: Some(10),
                    quantity: Some(5),
                    unit_price: Some(dec("10")),
                },
                OrderItemInput {
                    product_id: Some(11),
                    quantity: Some(3),
                    unit_price: Some(dec("20")),
                },
            ],
        };

        let draft = input.parse().unwrap();
        assert_eq!(draft.total_amount, dec("110"));
        assert_eq!(draft.items.len(), 2);
    }

    #[test]
    fn test_create_order_rejects_oversized_total() {
        let line = |quantity, price| OrderItemInput {
            product_id: Some(10),
            quantity: Some(quantity),
            unit_price: Some(dec(price)),
        };

        let huge_price = CreateOrderInput {
            supplier_id: Some(1),
            items: vec![line(i32::MAX, "100000000000000000000")],
        };
        assert_eq!(huge_price.parse().unwrap_err().field, "items[0].unit_price");

        let huge_total = CreateOrderInput {
            supplier_id: Some(1),
            items: vec![line(i32::MAX, "9999999999.99")],
        };
        assert_eq!(huge_total.parse().unwrap_err().field, "items");
    }

    #[test]
    fn test_order_total_overflow_is_an_error() {
        let lines = [
            OrderLineDraft {
                product_id: 1,
                quantity: i32::MAX,
                unit_price: Decimal::MAX,
            },
        ];
        assert_eq!(lines[0].line_total(), None);
        assert_eq!(order_total(&lines).unwrap_err().field, "items");
    }

    #[test]
    fn test_create_order_rejects_sub_cent_price() {
        let input = CreateOrderInput {
            supplier_id: Some(1),
            items: vec![OrderItemInput {
                product_id: Some(10),
                quantity: Some(3),
                unit_price: Some(dec("0.005")),
            }],
        };
        assert_eq!(input.parse().unwrap_err().field, "items[0].unit_price");
    }

    #[test]
    fn test_create_order_requires_items() {
        let input = CreateOrderInput {
            supplier_id: Some(1),
            items: vec![],
        };
        assert_eq!(input.parse().unwrap_err().field, "items");
    }

    #[test]
    fn test_create_order_rejects_zero_quantity() {
        let input = CreateOrderInput {
            supplier_id: Some(1),
            items: vec![OrderItemInput {
                product_id: Some(10),
                quantity: Some(0),
                unit_price: Some(dec("1.50")),
            }],
        };
        assert!(input.parse().is_err());
    }

    #[test]
    fn test_create_order_rejects_free_items() {
        let input = CreateOrderInput {
            supplier_id: Some(1),
            items: vec![OrderItemInput {
                product_id: Some(10),
                quantity: Some(2),
                unit_price: Some(Decimal::ZERO),
            }],
        };
        assert!(input.parse().is_err());
    }
}
