//! Live PostgreSQL reader over a single connection.

use async_trait::async_trait;
use novedades_core::{ProcedureFilter, RecordIndex};
use sqlx::Connection;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use tracing::info;

use crate::source::{ParamStyle, ProcedureSource, resolution_query};
use crate::{DbConfig, StoreError};

/// PostgreSQL store holding exactly one connection for the run.
pub struct PgStore {
    conn: PgConnection,
}

impl PgStore {
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);
        let conn = PgConnection::connect_with(&options).await?;
        info!(host = %config.host, port = config.port, database = %config.name, "connected to PostgreSQL");
        Ok(Self { conn })
    }
}

#[async_trait]
impl ProcedureSource for PgStore {
    async fn fetch_resolutions(
        &mut self,
        filter: &ProcedureFilter,
    ) -> Result<RecordIndex, StoreError> {
        let sql = resolution_query(&filter.table, ParamStyle::Numbered);
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .bind(&filter.municipality)
            .bind(filter.date_start.to_string())
            .bind(filter.date_end.to_string())
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn close(self) -> Result<(), StoreError> {
        self.conn.close().await?;
        Ok(())
    }
}
