use super::Statement;
use crate::Dialect;

use std::fmt;

/// Which of a step's statement lists to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Apply the step.
    Up,

    /// Revert the step.
    Down,
}

impl Direction {
    /// What a step reports when it starts running in this direction.
    pub fn progress_message(self) -> &'static str {
        match self {
            Direction::Up => "start running",
            Direction::Down => "reverting changes!",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
        })
    }
}

/// The statements a step runs on one dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Branch {
    /// The step deliberately does nothing on this dialect. Other migrations
    /// in the series cover it.
    #[default]
    NotApplicable,

    /// Forward and reverse statement lists, each executed in order.
    Statements {
        up: Vec<Statement>,
        down: Vec<Statement>,
    },
}

impl Branch {
    pub fn new<U, D>(up: U, down: D) -> Branch
    where
        U: IntoIterator,
        U::Item: Into<Statement>,
        D: IntoIterator,
        D::Item: Into<Statement>,
    {
        Branch::Statements {
            up: up.into_iter().map(Into::into).collect(),
            down: down.into_iter().map(Into::into).collect(),
        }
    }

    /// The statement list for `direction`. Empty when not applicable.
    pub fn statements(&self, direction: Direction) -> &[Statement] {
        match (self, direction) {
            (Branch::NotApplicable, _) => &[],
            (Branch::Statements { up, .. }, Direction::Up) => up,
            (Branch::Statements { down, .. }, Direction::Down) => down,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Branch::Statements { .. })
    }
}

/// One branch per supported dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branches {
    pub mysql: Branch,
    pub postgresql: Branch,
    pub sqlite: Branch,
}

impl Branches {
    pub fn get(&self, dialect: Dialect) -> &Branch {
        match dialect {
            Dialect::Mysql => &self.mysql,
            Dialect::Postgresql => &self.postgresql,
            Dialect::Sqlite => &self.sqlite,
        }
    }

    pub fn get_mut(&mut self, dialect: Dialect) -> &mut Branch {
        match dialect {
            Dialect::Mysql => &mut self.mysql,
            Dialect::Postgresql => &mut self.postgresql,
            Dialect::Sqlite => &mut self.sqlite,
        }
    }

    /// Iterate over `(dialect, branch)` pairs in [`Dialect::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Dialect, &Branch)> + '_ {
        Dialect::ALL
            .into_iter()
            .map(move |dialect| (dialect, self.get(dialect)))
    }
}
