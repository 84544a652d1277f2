use std::fmt;

/// Marker line separating statements in a migration script.
pub const BREAKPOINT: &str = "-- #[stepwise::breakpoint]";

/// The raw text of a single DDL or DML statement. Statements never carry
/// bind parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement(String);

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Self(sql)
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a migration script into statements on [`BREAKPOINT`] lines.
///
/// Surrounding whitespace is trimmed and chunks left empty are skipped.
pub fn split_script(script: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in script.lines() {
        if line.trim() == BREAKPOINT {
            push_chunk(&mut statements, &current);
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_chunk(&mut statements, &current);

    statements
}

fn push_chunk(statements: &mut Vec<Statement>, chunk: &str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        statements.push(Statement::new(chunk));
    }
}

/// Join statements into a script that [`split_script`] reads back.
pub fn join_script<S: AsRef<str>>(statements: &[S]) -> String {
    let mut script = statements
        .iter()
        .map(|s| s.as_ref().trim())
        .collect::<Vec<_>>()
        .join(&format!("\n{BREAKPOINT}\n"));
    script.push('\n');
    script
}
