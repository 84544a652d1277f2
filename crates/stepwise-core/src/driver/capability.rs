#[derive(Debug)]
pub struct Capability {
    /// When true, DDL statements participate in transactions, so a failed
    /// migration step can be rolled back as a whole.
    pub transactional_ddl: bool,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        transactional_ddl: true,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self { ..Self::SQLITE };

    /// MySQL capabilities
    ///
    /// MySQL commits implicitly before and after every DDL statement, so
    /// wrapping a migration step in a transaction would not make it atomic.
    pub const MYSQL: Self = Self {
        transactional_ddl: false,
    };
}
