use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// SQL dialect family a migration branch is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Mysql,
    Postgresql,
    Sqlite,
}

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Dialect; 3] = [Dialect::Mysql, Dialect::Postgresql, Dialect::Sqlite];

    /// Maps a connection's configured engine kind to its dialect family.
    ///
    /// Engine kinds are matched exactly. Anything outside the supported set,
    /// including near matches such as `MySQL` or `mariadb`, is an error rather
    /// than a fallback to some default dialect.
    pub fn from_engine_kind(kind: &str) -> Result<Dialect> {
        match kind {
            "mysql" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" => Ok(Dialect::Postgresql),
            "sqlite" | "better-sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(Error::unsupported_dialect(kind)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgresql => "postgresql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Dialect::from_engine_kind(s)
    }
}
