mod m0001_listings;
mod m0002_listing_indexes;

use cetane::prelude::MigrationRegistry;

pub fn registry() -> MigrationRegistry {
    let mut reg = MigrationRegistry::new();
    reg.register(m0001_listings::migration());
    reg.register(m0002_listing_indexes::migration());
    reg
}
