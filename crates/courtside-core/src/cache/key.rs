use std::fmt;

/// Schema version of the cached standings (`Vec<Team>`)
pub const STANDINGS_VERSION: u32 = 2;
/// Schema version of the cached schedule (`Vec<Game>`)
pub const SCHEDULE_VERSION: u32 = 3;
/// Schema version of a cached `TeamDetailBundle`
pub const TEAM_DETAILS_VERSION: u32 = 3;

/// Resource name plus schema version, rendered as `{resource}_v{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(resource: &str, version: u32) -> Self {
        Self(format!("{}_v{}", resource, version))
    }

    pub fn standings() -> Self {
        Self::new("standings", STANDINGS_VERSION)
    }

    pub fn schedule() -> Self {
        Self::new("schedule", SCHEDULE_VERSION)
    }

    pub fn team_details(team_id: &str) -> Self {
        Self::new(&format!("team_details_{}", team_id), TEAM_DETAILS_VERSION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
