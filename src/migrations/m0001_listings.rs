use cetane::prelude::*;

pub fn migration() -> Migration {
    Migration::new("0001_listings").operation(RunSql::new(
        r#"CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    location TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    last_updated TEXT NOT NULL
)"#,
    ))
}
