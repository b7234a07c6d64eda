//! LanceDB connection helpers.
use anyhow::Result;
use arrow_array::RecordBatchIterator;
use lancedb::{connect, Connection, Table};
use std::sync::Arc;

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn.table_names().execute().await?.iter().any(|n| n == name))
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

pub async fn open_table_if_exists(conn: &Connection, name: &str) -> Result<Option<Table>> {
    if !table_exists(conn, name).await? {
        return Ok(None);
    }
    Ok(Some(conn.open_table(name).execute().await?))
}
