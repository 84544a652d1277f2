mod applied;
pub use applied::AppliedMigration;

mod branch;
pub use branch::{Branch, Branches, Direction};

mod statement;
pub use statement::{join_script, split_script, Statement, BREAKPOINT};

mod step;
pub use step::{Lint, MigrationStep};
