//! PostgreSQL implementation of `ResultStore`.
//!
//! The pipeline writes evaluations as JSONB into a table whose name varies
//! between deployments, so the actual table is discovered lazily from
//! `information_schema` and cached once found. While the pipeline has not
//! processed anything yet there is no table at all; queries then return
//! empty results instead of erroring.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use tracing::{info, warn};

use fraudgate_core::config::PgConfig;
use fraudgate_core::stats::StatsSummary;

use crate::{clamp_per_page, EvaluationRow, ResultPage, ResultStore, StoreError};

/// Table names the pipeline is known to use for evaluations.
const EVAL_TABLE_CANDIDATES: [&str; 5] = [
    "evaluationresult",
    "evaluationresults",
    "evaluation",
    "evaluations",
    "results",
];

/// Table names the pipeline is known to use for event history.
const EVENT_TABLE_CANDIDATES: [&str; 4] = [
    "transactionhistory",
    "transaction_history",
    "transaction",
    "transactions",
];

/// Discovered-table cache: `None` until a real table shows up, after which
/// the name is pinned for the process lifetime.
#[derive(Default)]
struct TableCache {
    name: Option<String>,
}

pub struct PgResultStore {
    eval_pool: PgPool,
    event_pool: PgPool,
    eval_table: RwLock<TableCache>,
    event_table: RwLock<TableCache>,
}

impl PgResultStore {
    /// Connect both pools from config.
    pub async fn connect(eval: &PgConfig, event: &PgConfig) -> Result<Self, StoreError> {
        let eval_pool = PgPoolOptions::new()
            .max_connections(eval.max_connections)
            .connect(&eval.connection_string())
            .await?;
        let event_pool = PgPoolOptions::new()
            .max_connections(event.max_connections)
            .connect(&event.connection_string())
            .await?;
        info!(
            "Result store connected (eval db: {}, event db: {})",
            eval.database, event.database
        );
        Ok(Self::new(eval_pool, event_pool))
    }

    pub fn new(eval_pool: PgPool, event_pool: PgPool) -> Self {
        Self {
            eval_pool,
            event_pool,
            eval_table: RwLock::new(TableCache::default()),
            event_table: RwLock::new(TableCache::default()),
        }
    }

    async fn list_tables(pool: &PgPool) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.try_get::<String, _>("table_name").ok())
            .collect())
    }

    /// Resolve a table name against a candidate list. A single unknown
    /// table is taken as-is; an empty database yields `None`.
    fn pick_table(tables: &[String], candidates: &[&str]) -> Option<String> {
        if tables.is_empty() {
            return None;
        }
        for candidate in candidates {
            if tables.iter().any(|t| t == candidate) {
                return Some((*candidate).to_string());
            }
        }
        if tables.len() == 1 {
            return Some(tables[0].clone());
        }
        None
    }

    /// Discover (or return the cached) evaluation table. Re-discovers on
    /// every call until the pipeline has created it.
    async fn eval_table(&self) -> Result<Option<String>, StoreError> {
        if let Some(name) = &self.eval_table.read().await.name {
            return Ok(Some(name.clone()));
        }
        let tables = Self::list_tables(&self.eval_pool).await?;
        let found = Self::pick_table(&tables, &EVAL_TABLE_CANDIDATES);
        match &found {
            Some(name) => {
                info!("Using evaluation table: {}", name);
                self.eval_table.write().await.name = Some(name.clone());
            }
            None => {
                info!(
                    "No evaluation table yet (tables: {:?}) — pipeline has not processed anything",
                    tables
                );
            }
        }
        Ok(found)
    }

    async fn event_table(&self) -> Result<Option<String>, StoreError> {
        if let Some(name) = &self.event_table.read().await.name {
            return Ok(Some(name.clone()));
        }
        let tables = Self::list_tables(&self.event_pool).await?;
        let found = Self::pick_table(&tables, &EVENT_TABLE_CANDIDATES);
        if let Some(name) = &found {
            info!("Using event history table: {}", name);
            self.event_table.write().await.name = Some(name.clone());
        }
        Ok(found)
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn list_results(
        &self,
        tenant_id: &str,
        page: u32,
        per_page: u32,
        status_filter: Option<&str>,
    ) -> Result<ResultPage, StoreError> {
        let Some(tbl) = self.eval_table().await? else {
            return Ok(ResultPage { results: Vec::new(), total: 0 });
        };

        let per_page = clamp_per_page(per_page);
        let offset = (page.max(1) as i64 - 1) * per_page as i64;

        let filter_clause = if status_filter.is_some() {
            " AND evaluation->'report'->>'status' = $2"
        } else {
            ""
        };
        let (limit_n, offset_n) = if status_filter.is_some() { (3, 4) } else { (2, 3) };

        let sql = format!(
            r#"SELECT
                   "messageid"                                          AS msg_id,
                   evaluation->>'transactionID'                         AS transaction_id,
                   evaluation->'report'->>'status'                      AS status,
                   evaluation->'report'->>'evaluationID'                AS evaluation_id,
                   evaluation->'report'->>'timestamp'                   AS evaluated_at,
                   evaluation->'report'->'tadpResult'->>'prcgTm'        AS processing_time_ns,
                   evaluation->'report'->'tadpResult'->'typologyResult' AS typology_results
               FROM "{tbl}"
               WHERE "tenantid" = $1{filter_clause}
               ORDER BY "messageid" DESC
               LIMIT ${limit_n} OFFSET ${offset_n}"#
        );

        let mut query = sqlx::query_as::<_, EvaluationRow>(&sql).bind(tenant_id);
        if let Some(tag) = status_filter {
            query = query.bind(tag);
        }
        let results = query
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.eval_pool)
            .await?;

        let count_sql = format!(
            r#"SELECT COUNT(*) AS total FROM "{tbl}" WHERE "tenantid" = $1{filter_clause}"#
        );
        let mut count_query = sqlx::query(&count_sql).bind(tenant_id);
        if let Some(tag) = status_filter {
            count_query = count_query.bind(tag);
        }
        let total: i64 = count_query
            .fetch_one(&self.eval_pool)
            .await?
            .try_get("total")?;

        Ok(ResultPage { results, total })
    }

    async fn get_result(
        &self,
        tenant_id: &str,
        msg_id: &str,
    ) -> Result<Option<Value>, StoreError> {
        let Some(tbl) = self.eval_table().await? else {
            return Ok(None);
        };

        let sql = format!(
            r#"SELECT evaluation FROM "{tbl}"
               WHERE "messageid" = $1 AND "tenantid" = $2
               LIMIT 1"#
        );
        let row = sqlx::query(&sql)
            .bind(msg_id)
            .bind(tenant_id)
            .fetch_optional(&self.eval_pool)
            .await?;

        Ok(row.and_then(|r| r.try_get::<Value, _>("evaluation").ok()))
    }

    async fn stats_summary(&self, tenant_id: &str) -> Result<StatsSummary, StoreError> {
        let mut summary = StatsSummary::default();

        if let Some(tbl) = self.eval_table().await? {
            let sql = format!(
                r#"SELECT
                       COUNT(*)                                                          AS total,
                       COUNT(*) FILTER (WHERE evaluation->'report'->>'status' = 'ALRT') AS alerts,
                       COUNT(*) FILTER (WHERE evaluation->'report'->>'status' = 'NALT') AS no_alerts
                   FROM "{tbl}"
                   WHERE "tenantid" = $1"#
            );
            let row = sqlx::query(&sql)
                .bind(tenant_id)
                .fetch_one(&self.eval_pool)
                .await?;
            summary.evaluations_total = row.try_get::<i64, _>("total")?.max(0) as u64;
            summary.alerts = row.try_get::<i64, _>("alerts")?.max(0) as u64;
            summary.no_alerts = row.try_get::<i64, _>("no_alerts")?.max(0) as u64;
        }

        // Event history lives in its own database; failures there degrade
        // the one counter rather than the whole summary.
        match self.event_table().await {
            Ok(Some(tbl)) => {
                let sql =
                    format!(r#"SELECT COUNT(*) AS cnt FROM "{tbl}" WHERE "tenantid" = $1"#);
                match sqlx::query(&sql)
                    .bind(tenant_id)
                    .fetch_one(&self.event_pool)
                    .await
                {
                    Ok(row) => {
                        summary.event_history_transactions =
                            row.try_get::<i64, _>("cnt")?.max(0) as u64;
                    }
                    Err(e) => warn!("event history count failed: {}", e),
                }
            }
            Ok(None) => {}
            Err(e) => warn!("event history table discovery failed: {}", e),
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_known_candidate_first() {
        let tables = names(&["audit", "evaluationresult", "zzz"]);
        assert_eq!(
            PgResultStore::pick_table(&tables, &EVAL_TABLE_CANDIDATES),
            Some("evaluationresult".to_string())
        );
    }

    #[test]
    fn single_unknown_table_is_taken_as_is() {
        let tables = names(&["whatever"]);
        assert_eq!(
            PgResultStore::pick_table(&tables, &EVAL_TABLE_CANDIDATES),
            Some("whatever".to_string())
        );
    }

    #[test]
    fn empty_database_yields_none() {
        assert_eq!(PgResultStore::pick_table(&[], &EVAL_TABLE_CANDIDATES), None);
    }

    #[test]
    fn multiple_unknown_tables_yield_none() {
        let tables = names(&["aaa", "bbb"]);
        assert_eq!(PgResultStore::pick_table(&tables, &EVAL_TABLE_CANDIDATES), None);
    }

    #[test]
    fn event_candidates_prefer_history_tables() {
        let tables = names(&["transaction", "transactionhistory"]);
        assert_eq!(
            PgResultStore::pick_table(&tables, &EVENT_TABLE_CANDIDATES),
            Some("transactionhistory".to_string())
        );
    }
}
