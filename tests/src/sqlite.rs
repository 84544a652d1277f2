use stepwise_driver_sqlite::Connection;

/// One row of `sqlite_master`, excluding the ledger table and SQLite's own
/// objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaEntry {
    pub kind: String,
    pub name: String,
    pub table: String,
    pub sql: Option<String>,
}

/// Introspect the schema of a SQLite connection, sorted for comparison.
pub fn schema(conn: &Connection) -> Vec<SchemaEntry> {
    let mut stmt = conn
        .as_rusqlite()
        .prepare(
            "SELECT type, name, tbl_name, sql FROM sqlite_master \
             WHERE name NOT LIKE 'sqlite_%' AND tbl_name != '__stepwise_migrations' \
             ORDER BY type, name",
        )
        .unwrap();

    stmt.query_map([], |row| {
        Ok(SchemaEntry {
            kind: row.get(0)?,
            name: row.get(1)?,
            table: row.get(2)?,
            sql: row.get(3)?,
        })
    })
    .unwrap()
    .collect::<Result<Vec<_>, _>>()
    .unwrap()
}
