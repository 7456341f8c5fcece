// SPDX-FileCopyrightText: 2026 hookrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive component transformation.

use hookrelay_core::limits::MAX_COMPONENTS_PER_ROW;
use serde_json::{Value, json};

/// Component type id of an action row.
const ACTION_ROW: u64 = 1;

fn is_action_row(component: &Value) -> bool {
    component.get("type").and_then(Value::as_u64) == Some(ACTION_ROW)
}

/// Wraps bare components into action rows.
///
/// Consecutive bare components share a row of at most five; existing action
/// rows pass through unchanged and close any row being filled, so relative
/// order is kept.
pub fn wrap_in_action_rows(components: Vec<Value>) -> Vec<Value> {
    let mut rows = Vec::new();
    let mut pending: Vec<Value> = Vec::new();

    let flush = |pending: &mut Vec<Value>, rows: &mut Vec<Value>| {
        if !pending.is_empty() {
            rows.push(json!({"type": ACTION_ROW, "components": std::mem::take(pending)}));
        }
    };

    for component in components {
        if is_action_row(&component) {
            flush(&mut pending, &mut rows);
            rows.push(component);
            continue;
        }
        if pending.len() == MAX_COMPONENTS_PER_ROW {
            flush(&mut pending, &mut rows);
        }
        pending.push(component);
    }
    flush(&mut pending, &mut rows);

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(id: u32) -> Value {
        json!({"type": 2, "style": 1, "label": format!("b{id}"), "custom_id": format!("b{id}")})
    }

    #[test]
    fn bare_buttons_are_grouped_by_five() {
        let rows = wrap_in_action_rows((0..7).map(button).collect());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["components"].as_array().unwrap().len(), 5);
        assert_eq!(rows[1]["components"].as_array().unwrap().len(), 2);
        assert_eq!(rows[1]["components"][0]["label"], "b5");
    }

    #[test]
    fn existing_rows_pass_through_in_order() {
        let row = json!({"type": 1, "components": [button(9)]});
        let rows = wrap_in_action_rows(vec![button(0), row.clone(), button(1)]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["components"][0]["label"], "b0");
        assert_eq!(rows[1], row);
        assert_eq!(rows[2]["components"][0]["label"], "b1");
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(wrap_in_action_rows(Vec::new()).is_empty());
    }
}
