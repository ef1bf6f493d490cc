use cetane::prelude::*;

pub fn migration() -> Migration {
    Migration::new("0002_listing_indexes")
        .depends_on(&["0001_listings"])
        .operation(RunSql::new(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_listings_url ON listings(url)",
        ))
        .operation(RunSql::new(
            "CREATE INDEX IF NOT EXISTS idx_listings_last_updated ON listings(last_updated)",
        ))
        .operation(RunSql::new(
            "CREATE INDEX IF NOT EXISTS idx_listings_source ON listings(source)",
        ))
}
