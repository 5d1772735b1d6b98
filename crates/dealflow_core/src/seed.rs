//! Bundled fixture data used to initialize a fresh store.
//!
//! # Invariants
//! - Fixtures are compiled into the crate; seeding never touches the file
//!   system.
//! - Fixture order is storage order after seeding.

use crate::model::{Activity, Contact, Deal, EntityKind};
use crate::repo::RepoError;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACTS_JSON: &str = include_str!("../fixtures/contacts.json");
const DEALS_JSON: &str = include_str!("../fixtures/deals.json");
const ACTIVITIES_JSON: &str = include_str!("../fixtures/activities.json");

/// All three collections, in storage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedData {
    pub contacts: Vec<Contact>,
    pub deals: Vec<Deal>,
    pub activities: Vec<Activity>,
}

#[derive(Debug)]
pub enum SeedError {
    Parse {
        kind: EntityKind,
        source: serde_json::Error,
    },
    /// A parsed record was rejected by its repository.
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { kind, source } => write!(f, "invalid {kind} fixture: {source}"),
            Self::Repo(err) => write!(f, "rejected seed record: {err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Parses the bundled fixtures.
pub fn load_seed() -> Result<SeedData, SeedError> {
    parse_seed(CONTACTS_JSON, DEALS_JSON, ACTIVITIES_JSON)
}

/// Parses caller-provided fixture documents (JSON arrays, camelCase fields).
pub fn parse_seed(
    contacts_json: &str,
    deals_json: &str,
    activities_json: &str,
) -> Result<SeedData, SeedError> {
    Ok(SeedData {
        contacts: parse_collection(contacts_json, EntityKind::Contact)?,
        deals: parse_collection(deals_json, EntityKind::Deal)?,
        activities: parse_collection(activities_json, EntityKind::Activity)?,
    })
}

fn parse_collection<T: DeserializeOwned>(
    json: &str,
    kind: EntityKind,
) -> Result<Vec<T>, SeedError> {
    serde_json::from_str(json).map_err(|source| SeedError::Parse { kind, source })
}

#[cfg(test)]
mod tests {
    use super::{load_seed, parse_seed, SeedError};
    use crate::model::EntityKind;

    #[test]
    fn bundled_fixtures_parse() {
        let seed = load_seed().expect("bundled fixtures should parse");
        assert_eq!(seed.contacts.len(), 5);
        assert_eq!(seed.deals.len(), 6);
        assert_eq!(seed.activities.len(), 8);
    }

    #[test]
    fn parse_error_names_the_collection() {
        let err = parse_seed("[]", "{not json", "[]").unwrap_err();
        assert!(matches!(
            err,
            SeedError::Parse {
                kind: EntityKind::Deal,
                ..
            }
        ));
    }
}
