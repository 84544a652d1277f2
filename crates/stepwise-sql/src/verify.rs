use crate::model::{Replayed, SchemaModel};

use stepwise_core::{Dialect, Direction, Error, MigrationStep, Result};

/// A statement the verifier could not model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    pub direction: Direction,

    /// Zero-based position in the statement list.
    pub index: usize,

    pub reason: String,
}

/// Outcome of a successful round-trip verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Statements whose effect was reflected in the model.
    pub modeled: usize,

    pub opaque: Vec<Opaque>,
}

/// Replay `step`'s `up` then `down` statements for `dialect` on top of
/// `baseline` and check the result equals `baseline`.
///
/// Fails on the first statement a database would reject at that point in the
/// sequence, or when the reverse list leaves objects behind or removes objects
/// it did not create. A branch marked not applicable passes trivially.
pub fn verify_round_trip(
    step: &MigrationStep,
    dialect: Dialect,
    baseline: &SchemaModel,
) -> Result<Report> {
    let branch = step.branches().get(dialect);
    let mut report = Report::default();
    let mut model = baseline.clone();

    for direction in [Direction::Up, Direction::Down] {
        for (index, statement) in branch.statements(direction).iter().enumerate() {
            let replayed = model.apply(dialect, statement.as_str()).map_err(|message| {
                Error::verification_failed(format!(
                    "{} ({dialect} {direction} #{}): {message}",
                    step.qualified_name(),
                    index + 1
                ))
            })?;

            match replayed {
                Replayed::Modeled => report.modeled += 1,
                Replayed::Opaque(reason) => {
                    tracing::debug!(
                        migration = %step.qualified_name(),
                        %direction,
                        index,
                        %reason,
                        "statement not modeled"
                    );
                    report.opaque.push(Opaque {
                        direction,
                        index,
                        reason,
                    });
                }
            }
        }
    }

    let changes = baseline.diff(&model);
    if !changes.is_empty() {
        let mut message = format!(
            "{} ({dialect}): down does not restore the schema: {}",
            step.qualified_name(),
            changes.join(", ")
        );
        if !report.opaque.is_empty() {
            message.push_str(&format!(
                " ({} statement(s) could not be modeled)",
                report.opaque.len()
            ));
        }
        return Err(Error::verification_failed(message));
    }

    Ok(report)
}
