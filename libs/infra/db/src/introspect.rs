//! Catalog introspection used by the dynamic scenario to discover a
//! table's shape at first use. Every query here reads from
//! `information_schema`, which is portable across the Postgres-family
//! servers the connection string may point at.

use tokio_postgres::Client;

use crate::error::DbError;

#[derive(Debug, Clone, PartialEq)]
pub struct IntrospectedColumn {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    pub has_default: bool,
    pub is_serial: bool,
}

/// Splits a `"schema.table"` or bare `"table"` reference. Returns the
/// schema (if given) and the bare table name.
pub fn parse_table_ref(raw: &str) -> (Option<String>, String) {
    match raw.split_once('.') {
        Some((schema, table)) => (Some(schema.to_string()), table.to_string()),
        None => (None, raw.to_string()),
    }
}

/// Picks the first base table in the default schema, alphabetically.
pub async fn first_base_table(client: &Client) -> Result<Option<String>, DbError> {
    let row = client
        .query_opt(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
             ORDER BY table_name ASC LIMIT 1",
            &[],
        )
        .await?;
    Ok(row.map(|r| r.get::<_, String>(0)))
}

/// Loads every column of `table` (optionally schema-qualified) in
/// ordinal order.
pub async fn load_columns(
    client: &Client,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<IntrospectedColumn>, DbError> {
    let rows = client
        .query(
            "SELECT column_name, data_type, is_nullable, column_default \
             FROM information_schema.columns \
             WHERE table_schema = COALESCE($1, current_schema()) AND table_name = $2 \
             ORDER BY ordinal_position ASC",
            &[&schema, &table],
        )
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let default: Option<String> = row.get(3);
            let is_serial = default
                .as_deref()
                .map(|d| d.trim_start().to_lowercase().starts_with("nextval("))
                .unwrap_or(false);
            IntrospectedColumn {
                name: row.get(0),
                declared_type: row.get(1),
                nullable: row.get::<_, String>(2) == "YES",
                has_default: default.is_some(),
                is_serial,
            }
        })
        .collect())
}

/// Resolves the single-column primary key of `table`, if one exists.
/// Returns `(column_name, declared_type)`.
pub async fn primary_key(
    client: &Client,
    schema: Option<&str>,
    table: &str,
) -> Result<Option<(String, String)>, DbError> {
    let rows = client
        .query(
            "SELECT kcu.column_name, c.data_type \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
             JOIN information_schema.columns c \
               ON c.table_schema = kcu.table_schema AND c.table_name = kcu.table_name AND c.column_name = kcu.column_name \
             WHERE tc.constraint_type = 'PRIMARY KEY' \
               AND tc.table_schema = COALESCE($1, current_schema()) AND tc.table_name = $2 \
             ORDER BY kcu.ordinal_position ASC",
            &[&schema, &table],
        )
        .await?;

    if rows.len() != 1 {
        return Ok(None);
    }
    let row = &rows[0];
    Ok(Some((row.get(0), row.get(1))))
}

/// Highest existing value of an integer-family primary key, clamped to
/// at least 1. Defaults to 1 on an empty table.
pub async fn max_integer_id(
    client: &Client,
    schema: Option<&str>,
    table: &str,
    id_column: &str,
) -> Result<i64, DbError> {
    let query = format!(
        "SELECT COALESCE(MAX({id_column}), 0) FROM {}",
        qualify(schema, table)
    );
    let row = client.query_one(&query, &[]).await?;
    let max: i64 = row.get(0);
    Ok(max.max(1))
}

/// Reads up to `limit` existing id values cast to text, in no
/// particular order. Used both to seed a sampled-id cache and as the
/// static scenarios' cache fallback.
pub async fn seed_ids_as_text(
    client: &Client,
    schema: Option<&str>,
    table: &str,
    id_column: &str,
    limit: i64,
) -> Result<Vec<String>, DbError> {
    let query = format!(
        "SELECT {id_column}::text FROM {} LIMIT $1",
        qualify(schema, table)
    );
    let rows = client.query(&query, &[&limit]).await?;
    Ok(rows.into_iter().map(|r| r.get::<_, String>(0)).collect())
}

fn qualify(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{schema}.{table}"),
        None => table.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_schema_qualified_table() {
        assert_eq!(
            parse_table_ref("test.widgets"),
            (Some("test".to_string()), "widgets".to_string())
        );
    }

    #[test]
    fn parses_bare_table() {
        assert_eq!(parse_table_ref("widgets"), (None, "widgets".to_string()));
    }

    #[test]
    fn qualifies_with_and_without_schema() {
        assert_eq!(qualify(Some("test"), "widgets"), "test.widgets");
        assert_eq!(qualify(None, "widgets"), "widgets");
    }
}
