//! Tool categories

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A category from `GET /category`. The backend sends either plain strings
/// or `{id, name}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCategory {
    Name(String),
    Record { id: Option<i64>, name: String },
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawCategory::deserialize(deserializer)? {
            RawCategory::Name(name) => Category { id: None, name },
            RawCategory::Record { id, name } => Category { id, name },
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
