//! WebAssembly module for the warehouse inventory client
//!
//! Provides client-side computation for:
//! - Order totals while a purchase order is being drafted
//! - Previewing the stock effect of a status change
//! - Checking a manual adjustment before it is submitted

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    apply_delta, order_total, plan_transition, FloorPolicy, MovementType, OrderItemInput,
    OrderLineDraft, OrderStatus, TransitionPlan,
};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

/// What a status change would do, as returned by `preview_transition`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TransitionPreview {
    pub plan: TransitionPlan,
    pub touches_stock: bool,
    pub undefined_rule: bool,
}

/// Sum of quantity × unit price over a JSON array of order lines
#[wasm_bindgen]
pub fn calculate_order_total(items_json: &str) -> Result<String, JsValue> {
    order_total_from_json(items_json)
        .map(|total| total.to_string())
        .map_err(|e| JsValue::from_str(&e))
}

/// Planned stock effect of moving an order from `current` to `requested`, as JSON
#[wasm_bindgen]
pub fn preview_transition(current: &str, requested: &str) -> Result<String, JsValue> {
    let preview = transition_preview(current, requested).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&preview).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// On-hand quantity after a manual adjustment, or the reason it would be refused
#[wasm_bindgen]
pub fn check_manual_adjustment(
    on_hand: i32,
    movement_type: &str,
    quantity: i32,
) -> Result<i32, JsValue> {
    manual_adjustment_result(on_hand, movement_type, quantity).map_err(|e| JsValue::from_str(&e))
}

fn order_total_from_json(items_json: &str) -> Result<Decimal, String> {
    let items: Vec<OrderItemInput> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;
    if items.is_empty() {
        return Err("Order must have at least one item".to_string());
    }

    let lines = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            item.parse()
                .map_err(|e| format!("items[{}].{}: {}", i, e.field, e.message))
        })
        .collect::<Result<Vec<OrderLineDraft>, String>>()?;

    order_total(&lines).map_err(|e| format!("{}: {}", e.field, e.message))
}

fn transition_preview(current: &str, requested: &str) -> Result<TransitionPreview, String> {
    let current: OrderStatus = current.parse().map_err(|e: InputError| e.message)?;
    let requested: OrderStatus = requested.parse().map_err(|e: InputError| e.message)?;
    let plan = plan_transition(current, requested);

    Ok(TransitionPreview {
        plan,
        touches_stock: plan.touches_stock(),
        undefined_rule: TransitionPlan::is_undefined_rule(current, requested),
    })
}

fn manual_adjustment_result(on_hand: i32, movement_type: &str, quantity: i32) -> Result<i32, String> {
    let movement_type: MovementType = movement_type.parse().map_err(|e: InputError| e.message)?;
    if quantity <= 0 {
        return Err("quantity must be greater than zero".to_string());
    }

    apply_delta(on_hand, movement_type.signed(quantity), FloorPolicy::Reject)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total() {
        let json = r#"[
            {"product_id": 1, "quantity": 5, "unit_price": "10"},
            {"product_id": 2, "quantity": 3, "unit_price": "20.50"}
        ]"#;
        assert_eq!(order_total_from_json(json).unwrap(), Decimal::new(11150, 2));
    }

    #[test]
    fn test_order_total_rejects_bad_line() {
        let json = r#"[{"product_id": 1, "quantity": 0, "unit_price": "10"}]"#;
        let err = order_total_from_json(json).unwrap_err();
        assert!(err.starts_with("items[0].quantity"), "{}", err);

        let json = r#"[{"product_id": 1, "quantity": 3, "unit_price": "0.005"}]"#;
        let err = order_total_from_json(json).unwrap_err();
        assert!(err.starts_with("items[0].unit_price"), "{}", err);

        assert!(order_total_from_json("[]").is_err());
        assert!(order_total_from_json("not json").is_err());
    }

    #[test]
    fn test_order_total_beyond_storage_is_rejected() {
        let json = format!(
            r#"[{{"product_id": 1, "quantity": {}, "unit_price": "9999999999.99"}}]"#,
            i32::MAX
        );
        let err = order_total_from_json(&json).unwrap_err();
        assert!(err.starts_with("items:"), "{}", err);
    }

    #[test]
    fn test_transition_preview() {
        let receive = transition_preview("pending", "received").unwrap();
        assert_eq!(receive.plan, TransitionPlan::ReceiveStock);
        assert!(receive.touches_stock);
        assert!(!receive.undefined_rule);

        let reopen = transition_preview("cancelled", "pending").unwrap();
        assert_eq!(reopen.plan, TransitionPlan::StatusOnly);
        assert!(reopen.undefined_rule);

        assert!(transition_preview("pending", "shipped").is_err());
    }

    #[test]
    fn test_manual_adjustment() {
        assert_eq!(manual_adjustment_result(2, "in", 5), Ok(7));
        assert_eq!(manual_adjustment_result(7, "out", 7), Ok(0));
        assert!(manual_adjustment_result(2, "out", 5).is_err());
        assert!(manual_adjustment_result(2, "sideways", 1).is_err());
        assert!(manual_adjustment_result(2, "in", 0).is_err());
    }
}
