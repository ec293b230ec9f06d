use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;

    // Databases created before favourites existed get the column with an empty array
    let has_favourites: bool = conn
        .prepare("SELECT COUNT(*) FROM pragma_table_info('users') WHERE name='favourites'")?
        .query_row([], |row| row.get::<_, i32>(0))
        .map(|c| c > 0)
        .unwrap_or(false);

    if !has_favourites {
        conn.execute_batch(
            "ALTER TABLE users ADD COLUMN favourites TEXT NOT NULL DEFAULT '[]';",
        )?;
    }

    Ok(())
}
