//! Identities (user agents) presented to job boards.

use std::path::Path;

use rand::Rng;
use tracing::{debug, warn};

/// Real browser user agents used when no pool is configured.
pub const BUILTIN_IDENTITIES: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Chrome on Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Firefox
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    // Edge on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Source of the identity string for the next session or request.
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> String;
}

/// Pool of identities, one picked at random per call.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    identities: Vec<String>,
}

impl IdentityPool {
    /// Pool containing the built-in browser identities.
    pub fn builtin() -> Self {
        Self {
            identities: BUILTIN_IDENTITIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Pool from an explicit list. An empty list yields the built-ins.
    pub fn from_list(identities: Vec<String>) -> Self {
        let identities: Vec<String> = identities
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if identities.is_empty() {
            return Self::builtin();
        }
        Self { identities }
    }

    /// Build a pool from inline entries plus an optional file.
    ///
    /// A missing or unreadable file is logged and ignored; if nothing
    /// usable remains the built-in identities are used.
    pub fn load(inline: &[String], file: Option<&Path>) -> Self {
        let mut identities = inline.to_vec();

        if let Some(path) = file {
            match std::fs::read_to_string(path) {
                Ok(contents) => identities.extend(parse_identity_lines(&contents)),
                Err(e) => warn!("Could not read identity file {}: {}", path.display(), e),
            }
        }

        let pool = Self::from_list(identities);
        debug!("Identity pool holds {} entries", pool.len());
        pool
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.identities.iter().any(|i| i == identity)
    }

    /// Pick a random identity.
    pub fn pick(&self) -> &str {
        let idx = rand::rng().random_range(0..self.identities.len());
        &self.identities[idx]
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IdentityProvider for IdentityPool {
    fn identity(&self) -> String {
        self.pick().to_string()
    }
}

/// Always presents the same identity.
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub String);

impl IdentityProvider for FixedIdentity {
    fn identity(&self) -> String {
        self.0.clone()
    }
}

/// Parse one identity per line, skipping blanks and `#` comments.
pub fn parse_identity_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_identity_lines_skips_comments() {
        let parsed = parse_identity_lines("# browsers\nAgent/1\n\n  Agent/2  \n#Agent/3\n");
        assert_eq!(parsed, vec!["Agent/1", "Agent/2"]);
    }

    #[test]
    fn test_empty_list_falls_back_to_builtin() {
        let pool = IdentityPool::from_list(vec!["  ".to_string()]);
        assert_eq!(pool.len(), BUILTIN_IDENTITIES.len());
        assert!(pool.identity().contains("Mozilla"));
    }

    #[test]
    fn test_missing_file_falls_back_silently() {
        let pool = IdentityPool::load(&[], Some(Path::new("/nonexistent/identities.txt")));
        assert_eq!(pool.len(), BUILTIN_IDENTITIES.len());
    }

    #[test]
    fn test_load_merges_inline_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# custom\nFileAgent/1.0").unwrap();

        let pool = IdentityPool::load(&["InlineAgent/1.0".to_string()], Some(file.path()));
        assert_eq!(pool.len(), 2);
        assert!(pool.contains("FileAgent/1.0"));
        assert!(pool.contains("InlineAgent/1.0"));
        assert!(pool.contains(pool.pick()));
    }

    #[test]
    fn test_fixed_identity() {
        assert_eq!(FixedIdentity("Bot/1".into()).identity(), "Bot/1");
    }
}
