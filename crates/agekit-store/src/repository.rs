//! The Apache AGE repository: the only boundary external callers use.
//!
//! Reads return fresh, independent `Graph` snapshots — never live-tracked
//! references — so staleness reasoning stays trivial. Writes go through the
//! diff/patch engine and commit as a single transaction per call; concurrent
//! `upsert_graph` calls for the same graph name are serialized by a
//! name-keyed mutex, while distinct names proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

use agekit_core::StoreConfig;
use agekit_graph::{Graph, Patch, Properties};

use crate::agtype::{self, AgValue};
use crate::cypher;
use crate::error::{Result, StoreError};

/// Cypher returning every vertex and edge of a graph.
const FULL_SCAN: &str = "MATCH (n) RETURN n UNION ALL MATCH ()-[e]->() RETURN e";

/// Repository over a Postgres instance with the AGE extension.
///
/// Clone is cheap (the pool is an `Arc` internally); the per-name upsert
/// locks are shared across clones.
#[derive(Clone)]
pub struct AgeRepository {
    pool: PgPool,
    upsert_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl AgeRepository {
    /// Connect and prepare every pooled connection for AGE use.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let dsn = config.data_source_name()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("CREATE EXTENSION IF NOT EXISTS age;").await?;
                    conn.execute("LOAD 'age';").await?;
                    conn.execute("SET search_path = ag_catalog, \"$user\", public;")
                        .await?;
                    Ok(())
                })
            })
            .connect(&config.dsn)
            .await?;

        tracing::info!(dsn = %dsn, "connected to Apache AGE store");
        Ok(Self {
            pool,
            upsert_locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// The underlying pool, for callers needing raw SQL access.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ── Namespace management ─────────────────────────────────────

    /// Idempotent creation of the graph namespace.
    pub async fn ensure_graph(&self, name: &str) -> Result<()> {
        if self.graph_exists(name).await? {
            return Ok(());
        }
        let sql = format!(
            "SELECT ag_catalog.create_graph({});",
            cypher::sql_string_literal(name)
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        tracing::info!(graph = name, "created graph namespace");
        Ok(())
    }

    pub async fn graph_exists(&self, name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM ag_catalog.ag_graph WHERE name = $1);")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// All graph names in the AGE catalog, sorted.
    pub async fn graph_names(&self) -> Result<Vec<String>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name::text FROM ag_catalog.ag_graph ORDER BY name;")
                .fetch_all(&self.pool)
                .await?;
        Ok(names)
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Full-scan fetch of a graph, returned as a fresh independent
    /// snapshot. Any decode failure aborts the whole fetch.
    pub async fn get_graph(&self, name: &str) -> Result<Graph> {
        if !self.graph_exists(name).await? {
            return Err(StoreError::GraphNotFound(name.to_string()));
        }
        let values = self.cypher_fetch(name, FULL_SCAN).await?;
        agtype::graph_from_values(name, values)
    }

    /// The persisted graph if it exists, otherwise a freshly ensured empty
    /// one.
    pub async fn get_or_create_graph(&self, name: &str) -> Result<Graph> {
        self.ensure_graph(name).await?;
        self.get_graph(name).await
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Diff `graph` against the persisted snapshot and apply the patch as
    /// one transaction — all mutations commit or none do. Returns the fresh
    /// post-upsert snapshot (store ids populated).
    pub async fn upsert_graph(&self, graph: &Graph) -> Result<Graph> {
        let lock = self.lock_for(graph.name());
        let _guard = lock.lock().await;
        self.upsert_graph_locked(graph).await
    }

    /// The body of `upsert_graph`; callers must hold the per-name lock.
    /// Single-entity upserts reuse this so their snapshot-merge-patch cycle
    /// stays atomic with respect to other upserts of the same graph.
    async fn upsert_graph_locked(&self, graph: &Graph) -> Result<Graph> {
        self.ensure_graph(graph.name()).await?;
        let persisted = self.get_graph(graph.name()).await?;

        graph.validate_edge_endpoints(|ident| persisted.vertices().contains_ident(ident))?;

        let patch = Patch::between(&persisted, graph);
        if patch.is_empty() {
            return Ok(persisted);
        }

        let mut tx = self.pool.begin().await?;
        for mutation in patch.mutations() {
            for statement in cypher::statements(mutation) {
                let sql = cypher::wrap(graph.name(), &statement);
                sqlx::query(&sql).execute(&mut *tx).await?;
            }
        }
        tx.commit().await?;
        tracing::info!(
            graph = graph.name(),
            mutations = patch.len(),
            "graph patch applied"
        );

        self.get_graph(graph.name()).await
    }

    /// Non-destructive vertex merge: named keys overwrite, unnamed keys
    /// survive, the vertex is created when its ident is unseen. Fails with
    /// `GraphNotFound` when the graph was never ensured.
    pub async fn upsert_vertex(
        &self,
        graph_name: &str,
        ident: &str,
        label: &str,
        properties: Properties,
    ) -> Result<Graph> {
        let lock = self.lock_for(graph_name);
        let _guard = lock.lock().await;

        let mut snapshot = self.get_graph(graph_name).await?;
        snapshot.upsert_vertex(label, ident, properties)?;
        self.upsert_graph_locked(&snapshot).await
    }

    /// Non-destructive edge merge; matches by ident when given, falling
    /// back to (start_ident, end_ident, label).
    pub async fn upsert_edge(
        &self,
        graph_name: &str,
        ident: Option<&str>,
        label: &str,
        start_ident: &str,
        end_ident: &str,
        properties: Properties,
    ) -> Result<Graph> {
        let lock = self.lock_for(graph_name);
        let _guard = lock.lock().await;

        let mut snapshot = self.get_graph(graph_name).await?;
        snapshot.upsert_edge(label, start_ident, end_ident, ident, properties)?;
        self.upsert_graph_locked(&snapshot).await
    }

    // ── Destructive operations ───────────────────────────────────

    /// Drop whole graph namespaces, cascading to their entities.
    /// Destructive, immediate, irreversible.
    pub async fn drop_graphs(&self, names: &[&str]) -> Result<()> {
        for name in names {
            if !self.graph_exists(name).await? {
                return Err(StoreError::GraphNotFound(name.to_string()));
            }
            let sql = format!(
                "SELECT ag_catalog.drop_graph({}, true);",
                cypher::sql_string_literal(name)
            );
            sqlx::query(&sql).execute(&self.pool).await?;
            tracing::info!(graph = %name, "dropped graph");
        }
        Ok(())
    }

    /// Delete one vertex (and its incident edges) by ident.
    pub async fn drop_vertex(&self, graph_name: &str, ident: &str) -> Result<()> {
        self.require_graph(graph_name).await?;
        let statement = format!(
            "MATCH (n {{ident: {}}}) DETACH DELETE n",
            cypher::quote_string(ident)
        );
        self.cypher_execute(graph_name, &statement).await
    }

    /// Delete one edge by ident.
    pub async fn drop_edge(&self, graph_name: &str, ident: &str) -> Result<()> {
        self.require_graph(graph_name).await?;
        let statement = format!(
            "MATCH ()-[e {{ident: {}}}]->() DELETE e",
            cypher::quote_string(ident)
        );
        self.cypher_execute(graph_name, &statement).await
    }

    /// Remove every entity while preserving the namespace.
    pub async fn truncate_graph(&self, name: &str) -> Result<()> {
        self.require_graph(name).await?;
        self.cypher_execute(name, "MATCH (n) DETACH DELETE n").await
    }

    // ── Cypher pass-through ──────────────────────────────────────

    /// Run a read query and decode every returned agtype value. Store
    /// errors surface unmodified; no retries at this layer.
    pub async fn cypher_fetch(&self, graph_name: &str, query: &str) -> Result<Vec<AgValue>> {
        let sql = cypher::wrap(graph_name, query);
        let rows: Vec<Option<String>> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        rows.into_iter()
            .flatten()
            .map(|text| agtype::decode(&text))
            .collect()
    }

    /// Run a write query, discarding any returned rows.
    pub async fn cypher_execute(&self, graph_name: &str, query: &str) -> Result<()> {
        let sql = cypher::wrap(graph_name, query);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────

    async fn require_graph(&self, name: &str) -> Result<()> {
        if !self.graph_exists(name).await? {
            return Err(StoreError::GraphNotFound(name.to_string()));
        }
        Ok(())
    }

    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.upsert_locks
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
