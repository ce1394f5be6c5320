use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::instrument;

use chariot_consumption::{ConsumptionLog, NewConsumption};
use chariot_core::{ItemId, LogId};
use chariot_inventory::{Cart, InventoryItem};

use super::{ChariotServices, ServiceError, ServiceResult};
use crate::store::{Collection, WriteBatch, fetch, fetch_all, fields};

/// Outcome of a replacement pass.
#[derive(Debug, Clone)]
pub struct ReplacementResult {
    pub log: ConsumptionLog,
    pub resolved: bool,
}

fn newest_first(logs: &mut [ConsumptionLog]) {
    logs.sort_by(|a, b| b.at.cmp(&a.at).then_with(|| b.id.cmp(&a.id)));
}

impl ChariotServices {
    /// Decrement stock for every cart line and open the matching log, in one
    /// batch. Cart ids missing from inventory are skipped; a quantity above
    /// the item's current stock rejects the whole cart.
    #[instrument(skip(self, cart), fields(lines = cart.len()), err)]
    pub async fn commit_consumption(
        &self,
        operator: &str,
        patient_ref: &str,
        cart: &Cart,
        now: DateTime<Utc>,
    ) -> ServiceResult<ConsumptionLog> {
        let mut found: Vec<(InventoryItem, u32)> = Vec::with_capacity(cart.len());
        let mut checked = Cart::new();
        for (id, qty) in cart.lines() {
            match fetch::<InventoryItem>(self.store(), id).await? {
                Some(item) => {
                    checked.set(&item, qty)?;
                    found.push((item, qty));
                }
                None => tracing::warn!(item = %id, "cart item not in inventory; skipped"),
            }
        }

        let log = ConsumptionLog::open(
            NewConsumption {
                id: LogId::new(),
                at: now,
                operator: operator.to_string(),
                patient_ref: patient_ref.to_string(),
                lines: found.iter().map(|(item, qty)| (item, *qty)).collect(),
            },
            cart.len(),
        )?;

        let mut batch = WriteBatch::new();
        for (item, qty) in &found {
            batch.update(
                Collection::Inventory,
                &item.id,
                fields([("stock", json!(item.consume(*qty)))]),
            );
        }
        batch.set(&log)?;
        self.store().commit(batch).await?;

        tracing::info!(log = %log.id, patient = %log.patient_ref, "consumption recorded");
        Ok(log)
    }

    /// Unresolved logs, newest first.
    pub async fn pending_replacements(&self) -> ServiceResult<Vec<ConsumptionLog>> {
        let mut logs: Vec<ConsumptionLog> = fetch_all::<ConsumptionLog>(self.store())
            .await?
            .into_iter()
            .filter(|l| !l.is_resolved())
            .collect();
        newest_first(&mut logs);
        Ok(logs)
    }

    /// Logs still waiting for replacement.
    ///
    /// Counted from the raw `status` field; a log that no longer decodes
    /// still counts.
    pub async fn unresolved_count(&self) -> ServiceResult<usize> {
        let rows = self.store().list(Collection::ConsumptionLogs).await?;
        Ok(rows
            .iter()
            .filter(|(_, body)| body.get("status").and_then(|s| s.as_str()) != Some("resolved"))
            .count())
    }

    /// Put the checked lines of one log back in stock.
    ///
    /// Lines whose inventory document has disappeared are still flagged
    /// replaced; only the stock write is skipped.
    #[instrument(skip(self, checked), fields(log = %log_id, checked = checked.len()), err)]
    pub async fn commit_replacement(
        &self,
        log_id: LogId,
        checked: &[ItemId],
        operator: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<ReplacementResult> {
        let mut log = fetch::<ConsumptionLog>(self.store(), &log_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("log {log_id}")))?;

        let outcome = log.replace(checked, operator, now)?;

        let mut batch = WriteBatch::new();
        for (id, qty) in &outcome.restock {
            match fetch::<InventoryItem>(self.store(), id).await? {
                Some(item) => {
                    batch.update(
                        Collection::Inventory,
                        id,
                        fields([("stock", json!(item.restock(*qty)))]),
                    );
                }
                None => tracing::warn!(item = %id, "replaced item no longer in inventory"),
            }
        }
        batch.set(&log)?;
        self.store().commit(batch).await?;

        tracing::info!(
            restocked = outcome.restock.len(),
            resolved = outcome.resolved,
            "replacement recorded"
        );
        Ok(ReplacementResult {
            log,
            resolved: outcome.resolved,
        })
    }

    /// All logs newest first, at most `limit`.
    pub async fn history(&self, limit: usize) -> ServiceResult<Vec<ConsumptionLog>> {
        let mut logs = fetch_all::<ConsumptionLog>(self.store()).await?;
        newest_first(&mut logs);
        logs.truncate(limit);
        Ok(logs)
    }

    /// Remove a resolved log from the history.
    #[instrument(skip(self), err)]
    pub async fn delete_log(&self, log_id: LogId) -> ServiceResult<()> {
        let log = fetch::<ConsumptionLog>(self.store(), &log_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("log {log_id}")))?;
        log.ensure_deletable()?;

        let mut batch = WriteBatch::new();
        batch.delete(Collection::ConsumptionLogs, log_id);
        self.store().commit(batch).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{item, services_with};
    use super::*;
    use chariot_core::DomainError;
    use chariot_inventory::Drawer;
    use chrono::Duration;

    fn id(s: &str) -> ItemId {
        s.parse().unwrap()
    }

    async fn stock_of(svc: &ChariotServices, s: &str) -> u32 {
        fetch::<InventoryItem>(svc.store(), &id(s))
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    #[tokio::test]
    async fn consume_then_replace_restores_stock() {
        let svc = services_with(vec![item("T1-01", "Compresses", Drawer::Drawer(1), 10, 10)]).await;
        let now = Utc::now();

        let cart: Cart = [(id("T1-01"), 4)].into_iter().collect();
        let log = svc.commit_consumption("Amina Benali", "24/12345", &cart, now).await.unwrap();
        assert_eq!(stock_of(&svc, "T1-01").await, 6);
        assert!(!log.is_resolved());
        assert_eq!(svc.pending_replacements().await.unwrap().len(), 1);

        let res = svc
            .commit_replacement(log.id, &[id("T1-01")], "Sara Idrissi", now)
            .await
            .unwrap();
        assert!(res.resolved);
        assert_eq!(stock_of(&svc, "T1-01").await, 10);
        assert_eq!(res.log.replaced_by.as_deref(), Some("Sara Idrissi"));
        assert!(svc.pending_replacements().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn consumption_can_empty_an_item_and_skips_unknown_items() {
        let svc = services_with(vec![item("A", "Gants", Drawer::Top, 2, 5)]).await;
        let cart: Cart = [(id("A"), 2), (id("GHOST"), 1)].into_iter().collect();

        let log = svc.commit_consumption("x", "IP-1", &cart, Utc::now()).await.unwrap();
        assert_eq!(stock_of(&svc, "A").await, 0);
        assert_eq!(log.lines.len(), 1);
        assert_eq!(log.product_count, 2);
    }

    #[tokio::test]
    async fn consumption_above_stock_is_rejected_and_writes_nothing() {
        let svc = services_with(vec![
            item("A", "Gants", Drawer::Top, 2, 5),
            item("B", "Sonde", Drawer::Drawer(2), 3, 3),
        ])
        .await;
        let cart: Cart = [(id("A"), 99), (id("B"), 1)].into_iter().collect();

        let err = svc.commit_consumption("x", "IP-9", &cart, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(stock_of(&svc, "A").await, 2);
        assert_eq!(stock_of(&svc, "B").await, 3);
        assert!(svc.history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn consumption_without_patient_writes_nothing() {
        let svc = services_with(vec![item("A", "Gants", Drawer::Top, 5, 5)]).await;
        let cart: Cart = [(id("A"), 1)].into_iter().collect();

        let err = svc.commit_consumption("x", "  ", &cart, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(stock_of(&svc, "A").await, 5);
        assert!(svc.history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_replacement_keeps_log_open() {
        let svc = services_with(vec![
            item("A", "Gants", Drawer::Top, 5, 5),
            item("B", "Sonde", Drawer::Drawer(2), 3, 3),
        ])
        .await;
        let cart: Cart = [(id("A"), 2), (id("B"), 1)].into_iter().collect();
        let log = svc.commit_consumption("x", "IP-2", &cart, Utc::now()).await.unwrap();

        let first = svc.commit_replacement(log.id, &[id("A")], "y", Utc::now()).await.unwrap();
        assert!(!first.resolved);
        assert_eq!(stock_of(&svc, "A").await, 5);
        assert_eq!(stock_of(&svc, "B").await, 2);

        // Re-checking an already replaced line changes nothing.
        let again = svc
            .commit_replacement(log.id, &[id("A"), id("B")], "y", Utc::now())
            .await
            .unwrap();
        assert!(again.resolved);
        assert_eq!(stock_of(&svc, "A").await, 5);
        assert_eq!(again.log.history.len(), 2);

        let err = svc
            .commit_replacement(log.id, &[id("A")], "y", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn replacement_flags_lines_whose_item_was_removed() {
        let svc = services_with(vec![
            item("A", "Gants", Drawer::Top, 5, 5),
            item("B", "Sonde", Drawer::Drawer(2), 3, 3),
        ])
        .await;
        let cart: Cart = [(id("A"), 2), (id("B"), 1)].into_iter().collect();
        let log = svc.commit_consumption("x", "IP-4", &cart, Utc::now()).await.unwrap();

        let mut batch = WriteBatch::new();
        batch.delete(Collection::Inventory, "A");
        svc.store().commit(batch).await.unwrap();

        let res = svc
            .commit_replacement(log.id, &[id("A"), id("B")], "y", Utc::now())
            .await
            .unwrap();
        assert!(res.resolved);
        assert!(res.log.lines.iter().all(|l| l.replaced));
        assert_eq!(stock_of(&svc, "B").await, 3);
        assert!(fetch::<InventoryItem>(svc.store(), &id("A")).await.unwrap().is_none());
        assert_eq!(svc.unresolved_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn undecodable_unresolved_log_still_counts() {
        let svc = services_with(vec![item("A", "Gants", Drawer::Top, 5, 5)]).await;
        let cart: Cart = [(id("A"), 1)].into_iter().collect();
        let log = svc.commit_consumption("x", "IP-5", &cart, Utc::now()).await.unwrap();

        let mut batch = WriteBatch::new();
        batch.update(
            Collection::ConsumptionLogs,
            log.id,
            fields([("product_count", json!("1"))]),
        );
        svc.store().commit(batch).await.unwrap();

        assert!(svc.pending_replacements().await.unwrap().is_empty());
        assert_eq!(svc.unresolved_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn replacement_of_missing_log_is_not_found() {
        let svc = services_with(vec![]).await;
        let err = svc
            .commit_replacement(LogId::new(), &[id("A")], "y", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn only_resolved_logs_can_be_deleted() {
        let svc = services_with(vec![item("A", "Gants", Drawer::Top, 5, 5)]).await;
        let cart: Cart = [(id("A"), 1)].into_iter().collect();
        let log = svc.commit_consumption("x", "IP-3", &cart, Utc::now()).await.unwrap();

        assert!(matches!(
            svc.delete_log(log.id).await,
            Err(ServiceError::Domain(DomainError::Conflict(_)))
        ));

        svc.commit_replacement(log.id, &[id("A")], "y", Utc::now()).await.unwrap();
        svc.delete_log(log.id).await.unwrap();
        assert!(svc.history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let svc = services_with(vec![item("A", "Gants", Drawer::Top, 50, 50)]).await;
        let cart: Cart = [(id("A"), 1)].into_iter().collect();
        let t0 = Utc::now();
        for i in 0..3 {
            svc.commit_consumption("x", &format!("IP-{i}"), &cart, t0 + Duration::minutes(i))
                .await
                .unwrap();
        }

        let logs = svc.history(2).await.unwrap();
        let refs: Vec<_> = logs.iter().map(|l| l.patient_ref.as_str()).collect();
        assert_eq!(refs, vec!["IP-2", "IP-1"]);
        assert_eq!(svc.unresolved_count().await.unwrap(), 3);
    }
}
