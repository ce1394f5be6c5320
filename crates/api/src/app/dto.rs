use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use chariot_auth::{permissions_for_role, UserAccount};
use chariot_checklist::{ChecklistRecord, Verdict};
use chariot_consumption::ConsumptionLog;
use chariot_core::ItemId;
use chariot_inventory::{DrawerGroup, InventoryItem, StockLevel};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsumptionRequest {
    pub patient_ref: String,
    /// item id -> quantity
    pub items: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
pub struct ReplacementRequest {
    pub item_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChecklistRequest {
    #[serde(default)]
    pub verdicts: BTreeMap<String, Verdict>,
    #[serde(default)]
    pub secured: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

// -------------------------
// Request helpers
// -------------------------

pub fn parse_item_id(raw: &str) -> Result<ItemId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid item id '{raw}'"),
        )
    })
}

pub fn parse_item_ids<'a>(
    raw: impl IntoIterator<Item = &'a String>,
) -> Result<Vec<ItemId>, axum::response::Response> {
    raw.into_iter().map(|s| parse_item_id(s)).collect()
}

// -------------------------
// Response mapping
// -------------------------

fn level_str(level: StockLevel) -> &'static str {
    match level {
        StockLevel::Low => "low",
        StockLevel::Full => "full",
    }
}

pub fn item_to_json(item: &InventoryItem) -> JsonValue {
    json!({
        "id": item.id,
        "name": item.name,
        "category": item.display_category(),
        "drawer": item.drawer.label(),
        "stock": item.stock,
        "allotment": item.allotment,
        "level": level_str(item.level()),
    })
}

pub fn drawer_to_json(group: &DrawerGroup) -> JsonValue {
    json!({
        "drawer": group.drawer.label(),
        "items": group.items.iter().map(item_to_json).collect::<Vec<_>>(),
    })
}

/// Manager overview row: no category, no level.
pub fn overview_row(item: &InventoryItem) -> JsonValue {
    json!({
        "name": item.name,
        "drawer": item.drawer.label(),
        "stock": item.stock,
        "allotment": item.allotment,
    })
}

pub fn log_to_json(log: &ConsumptionLog) -> JsonValue {
    json!({
        "id": log.id.to_string(),
        "at": log.at.to_rfc3339(),
        "operator": log.operator,
        "patient_ref": log.patient_ref,
        "status": log.status,
        "product_count": log.product_count,
        "lines": log.lines,
        "summary": log.summary_lines(),
        "replaced_at": log.replaced_at.map(|t| t.to_rfc3339()),
        "replaced_by": log.replaced_by,
        "history": log.history,
    })
}

pub fn checklist_to_json(record: &ChecklistRecord) -> JsonValue {
    json!({
        "id": record.id.to_string(),
        "at": record.at.to_rfc3339(),
        "operator": record.operator,
        "status": record.status,
        "item_count": record.entries.len(),
        "drawers_locked": record.drawers_locked,
        "key_attached": record.key_attached,
    })
}

pub fn user_to_json(user: &UserAccount) -> JsonValue {
    json!({
        "username": user.username,
        "display_name": user.display_name(),
        "role": user.role,
        "permissions": permissions_for_role(&user.role),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chariot_inventory::Drawer;

    #[test]
    fn item_json_hides_nan_category() {
        let item = InventoryItem {
            id: "T2-04".parse().unwrap(),
            name: "Cathéter 24G".to_string(),
            category: Some("nan".to_string()),
            drawer: Drawer::Drawer(2),
            stock: 1,
            allotment: 3,
        };
        let v = item_to_json(&item);
        assert_eq!(v["category"], JsonValue::Null);
        assert_eq!(v["drawer"], "Tiroir 2");
        assert_eq!(v["level"], "low");
    }

    #[test]
    fn checklist_request_parses_verdicts() {
        let req: ChecklistRequest = serde_json::from_value(json!({
            "verdicts": {"A": "conforme", "B": "manquant"},
            "secured": true
        }))
        .unwrap();
        assert_eq!(req.verdicts["A"], Verdict::Conforme);
        assert_eq!(req.verdicts["B"], Verdict::Manquant);
        assert!(req.secured);
    }

    #[test]
    fn bad_item_id_is_a_400() {
        let ids = vec!["ok".to_string(), "a/b".to_string()];
        let err = parse_item_ids(&ids).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
