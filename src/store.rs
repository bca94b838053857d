//! Durable message storage over SQLite.
//!
//! The store owns the only persisted table. Dedup relies on the
//! `message_id` primary key at the engine level, so concurrent inserts of
//! the same id can never both report `Created`.

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;

use crate::error::Result;
use crate::models::{IncomingMessage, Message};

const MAX_PAGE_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Duplicate,
}

impl InsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertOutcome::Created => "created",
            InsertOutcome::Duplicate => "duplicate",
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertOutcome::Duplicate)
    }
}

/// Conjunctive query predicates. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Exact match on the sender address.
    pub from: Option<String>,
    /// Inclusive lexicographic lower bound on `ts`.
    pub since: Option<String>,
    /// Case-insensitive substring match on `text`; rows with NULL text
    /// never match.
    pub q: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Clamp to the supported window: limit in [1, 500], offset >= 0.
    /// Out-of-range values are a caller mistake, not a store failure.
    pub fn clamped(self) -> Page {
        Page {
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
            offset: self.offset.max(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SenderCount {
    #[serde(rename = "from")]
    pub from_msisdn: String,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub total: i64,
    pub senders: i64,
    pub top_senders: Vec<SenderCount>,
    pub first_ts: Option<String>,
    pub last_ts: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    /// Open (creating if missing) the SQLite database at `url` and ensure
    /// the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool (tests use in-memory pools).
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                message_id  TEXT PRIMARY KEY,
                from_msisdn TEXT NOT NULL,
                to_msisdn   TEXT NOT NULL,
                ts          TEXT NOT NULL,
                text        TEXT,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_ts ON messages (ts)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Idempotent insert keyed by `message_id`. The conflict is resolved by
    /// the engine, so a duplicate attempt performs no mutation and the
    /// original row (including its `created_at`) is retained unchanged.
    pub async fn insert(&self, msg: &IncomingMessage) -> Result<InsertOutcome> {
        let created_at = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (message_id, from_msisdn, to_msisdn, ts, text, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(message_id) DO NOTHING
            "#,
        )
        .bind(&msg.message_id)
        .bind(&msg.from_msisdn)
        .bind(&msg.to_msisdn)
        .bind(&msg.ts)
        .bind(&msg.text)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Created)
        }
    }

    /// Paginated, filtered listing. Returns the total count of matching
    /// rows (ignoring paging) plus one page ordered by `(ts, message_id)`
    /// ascending.
    pub async fn query(&self, filter: &MessageFilter, page: Page) -> Result<(i64, Vec<Message>)> {
        let page = page.clamped();

        let mut count_qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM messages WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut rows_qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT message_id, from_msisdn, to_msisdn, ts, text, created_at \
             FROM messages WHERE 1=1",
        );
        push_filters(&mut rows_qb, filter);
        rows_qb.push(" ORDER BY ts ASC, message_id ASC LIMIT ");
        rows_qb.push_bind(page.limit);
        rows_qb.push(" OFFSET ");
        rows_qb.push_bind(page.offset);

        let rows = rows_qb
            .build_query_as::<Message>()
            .fetch_all(&self.pool)
            .await?;

        Ok((total, rows))
    }

    /// Aggregates over all stored rows. `first_ts`/`last_ts` are `None`
    /// when the store is empty.
    pub async fn stats(&self) -> Result<StatsSummary> {
        let (total, senders, first_ts, last_ts) =
            sqlx::query_as::<_, (i64, i64, Option<String>, Option<String>)>(
                "SELECT COUNT(*), COUNT(DISTINCT from_msisdn), MIN(ts), MAX(ts) FROM messages",
            )
            .fetch_one(&self.pool)
            .await?;

        let top_senders = sqlx::query_as::<_, SenderCount>(
            r#"
            SELECT from_msisdn, COUNT(*) AS count
            FROM messages
            GROUP BY from_msisdn
            ORDER BY count DESC, from_msisdn ASC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(StatsSummary {
            total,
            senders,
            top_senders,
            first_ts,
            last_ts,
        })
    }
}

/// Append the optional predicates as bound parameters. User input never
/// lands in the SQL text itself.
fn push_filters(qb: &mut QueryBuilder<Sqlite>, filter: &MessageFilter) {
    if let Some(ref from) = filter.from {
        qb.push(" AND from_msisdn = ");
        qb.push_bind(from.clone());
    }
    if let Some(ref since) = filter.since {
        qb.push(" AND ts >= ");
        qb.push_bind(since.clone());
    }
    if let Some(ref q) = filter.q {
        // instr keeps LIKE metacharacters in `q` literal and is NULL-safe:
        // instr(NULL, x) is NULL, which never satisfies > 0.
        qb.push(" AND instr(lower(text), lower(");
        qb.push_bind(q.clone());
        qb.push(")) > 0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> MessageStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MessageStore::with_pool(pool).await.unwrap()
    }

    fn msg(id: &str, from: &str, ts: &str, text: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            message_id: id.to_string(),
            from_msisdn: from.to_string(),
            to_msisdn: "+19999999999".to_string(),
            ts: ts.to_string(),
            text: text.map(|t| t.to_string()),
        }
    }

    #[tokio::test]
    async fn insert_then_duplicate() {
        let store = test_store().await;
        let m = msg("m1", "+15550001", "2024-01-01T00:00:00Z", Some("hi"));

        assert_eq!(store.insert(&m).await.unwrap(), InsertOutcome::Created);
        assert_eq!(store.insert(&m).await.unwrap(), InsertOutcome::Duplicate);

        let (total, rows) = store
            .query(&MessageFilter::default(), Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message_id, "m1");
    }

    #[tokio::test]
    async fn duplicate_does_not_mutate_original_row() {
        let store = test_store().await;
        store
            .insert(&msg("m1", "+15550001", "2024-01-01T00:00:00Z", Some("first")))
            .await
            .unwrap();

        let (_, rows) = store
            .query(&MessageFilter::default(), Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        let original = rows[0].clone();

        // Same id, entirely different fields: must be ignored wholesale.
        let outcome = store
            .insert(&msg("m1", "+15559999", "2030-12-31T00:00:00Z", Some("second")))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Duplicate);

        let (_, rows) = store
            .query(&MessageFilter::default(), Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(rows[0].from_msisdn, original.from_msisdn);
        assert_eq!(rows[0].ts, original.ts);
        assert_eq!(rows[0].text, original.text);
        assert_eq!(rows[0].created_at, original.created_at);
    }

    #[tokio::test]
    async fn ordering_is_ts_then_message_id() {
        let store = test_store().await;
        store.insert(&msg("b", "+1111", "2024-01-02T00:00:00Z", None)).await.unwrap();
        store.insert(&msg("c", "+1111", "2024-01-01T00:00:00Z", None)).await.unwrap();
        store.insert(&msg("a", "+1111", "2024-01-02T00:00:00Z", None)).await.unwrap();

        let (_, rows) = store
            .query(&MessageFilter::default(), Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn filters_are_conjunctive() {
        let store = test_store().await;
        store.insert(&msg("m1", "+A1", "2024-01-01T00:00:00Z", Some("hello foo"))).await.unwrap();
        store.insert(&msg("m2", "+A1", "2024-02-01T00:00:00Z", Some("nothing"))).await.unwrap();
        store.insert(&msg("m3", "+B2", "2024-02-01T00:00:00Z", Some("FOO bar"))).await.unwrap();
        store.insert(&msg("m4", "+A1", "2024-03-01T00:00:00Z", Some("more Foo"))).await.unwrap();

        let filter = MessageFilter {
            from: Some("+A1".to_string()),
            since: Some("2024-02-01T00:00:00Z".to_string()),
            q: Some("foo".to_string()),
        };
        let (total, rows) = store
            .query(&filter, Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].message_id, "m4");
    }

    #[tokio::test]
    async fn since_is_inclusive() {
        let store = test_store().await;
        store.insert(&msg("m1", "+1111", "2024-01-01", None)).await.unwrap();
        store.insert(&msg("m2", "+1111", "2024-01-02", None)).await.unwrap();

        let filter = MessageFilter {
            since: Some("2024-01-02".to_string()),
            ..Default::default()
        };
        let (total, rows) = store
            .query(&filter, Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].message_id, "m2");
    }

    #[tokio::test]
    async fn text_search_skips_null_text() {
        let store = test_store().await;
        store.insert(&msg("m1", "+1111", "2024-01-01", None)).await.unwrap();
        store.insert(&msg("m2", "+1111", "2024-01-02", Some("Hello World"))).await.unwrap();

        let filter = MessageFilter {
            q: Some("world".to_string()),
            ..Default::default()
        };
        let (total, rows) = store
            .query(&filter, Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].message_id, "m2");
    }

    #[tokio::test]
    async fn like_metacharacters_are_literal() {
        let store = test_store().await;
        store.insert(&msg("m1", "+1111", "2024-01-01", Some("100% done"))).await.unwrap();
        store.insert(&msg("m2", "+1111", "2024-01-02", Some("all done"))).await.unwrap();

        let filter = MessageFilter {
            q: Some("100%".to_string()),
            ..Default::default()
        };
        let (total, _) = store
            .query(&filter, Page { limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn paging_clamps_and_counts_all_matches() {
        let store = test_store().await;
        for i in 0..5 {
            store
                .insert(&msg(&format!("m{}", i), "+1111", &format!("2024-01-0{}", i + 1), None))
                .await
                .unwrap();
        }

        // Negative limit/offset must not error; limit clamps to 1.
        let (total, rows) = store
            .query(&MessageFilter::default(), Page { limit: -3, offset: -10 })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message_id, "m0");

        let (total, rows) = store
            .query(&MessageFilter::default(), Page { limit: 2, offset: 2 })
            .await
            .unwrap();
        assert_eq!(total, 5);
        let ids: Vec<&str> = rows.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m3"]);
    }

    #[tokio::test]
    async fn stats_over_known_distribution() {
        let store = test_store().await;
        let mut i = 0;
        for (sender, n) in [("+A", 3), ("+B", 5), ("+C", 1)] {
            for _ in 0..n {
                i += 1;
                store
                    .insert(&msg(&format!("m{}", i), sender, &format!("2024-01-{:02}", i), None))
                    .await
                    .unwrap();
            }
        }

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 9);
        assert_eq!(stats.senders, 3);
        assert_eq!(stats.top_senders[0].from_msisdn, "+B");
        assert_eq!(stats.top_senders[0].count, 5);
        assert_eq!(stats.first_ts.as_deref(), Some("2024-01-01"));
        assert_eq!(stats.last_ts.as_deref(), Some("2024-01-09"));
    }

    #[tokio::test]
    async fn stats_on_empty_store() {
        let store = test_store().await;
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.senders, 0);
        assert!(stats.top_senders.is_empty());
        assert_eq!(stats.first_ts, None);
        assert_eq!(stats.last_ts, None);
    }

    #[tokio::test]
    async fn created_at_is_utc_iso8601() {
        let store = test_store().await;
        store.insert(&msg("m1", "+1111", "2024-01-01", None)).await.unwrap();
        let (_, rows) = store
            .query(&MessageFilter::default(), Page { limit: 1, offset: 0 })
            .await
            .unwrap();
        assert!(rows[0].created_at.ends_with('Z'));
        assert!(rows[0].created_at.contains('T'));
    }
}
