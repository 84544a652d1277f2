use stepwise::{Migrator, MigrationStep};
use stepwise_driver_sqlite::Connection;
use tests::schema;

fn create_tag() -> MigrationStep {
    MigrationStep::new(1680071714132, "CreateTagTable").sqlite(
        [
            r#"CREATE TABLE "tag" ("id" varchar PRIMARY KEY NOT NULL, "name" varchar NOT NULL)"#,
            r#"CREATE INDEX "IDX_tag_name" ON "tag" ("name")"#,
        ],
        [r#"DROP INDEX "IDX_tag_name""#, r#"DROP TABLE "tag""#],
    )
}

#[tokio::test]
async fn second_up_fails() {
    let mut conn = Connection::in_memory().unwrap();
    let step = create_tag();

    step.up(&mut conn).await.unwrap();
    let after_first = schema(&conn);

    let err = step.up(&mut conn).await.unwrap_err();
    assert!(err.is_driver_operation_failed());
    assert!(err.to_string().contains("already exists"));

    assert_eq!(schema(&conn), after_first);
}

#[tokio::test]
async fn migrator_skips_applied_steps() {
    let mut conn = Connection::in_memory().unwrap();
    let migrator = Migrator::new([create_tag()]).unwrap();

    assert_eq!(migrator.up(&mut conn).await.unwrap().len(), 1);
    assert!(migrator.up(&mut conn).await.unwrap().is_empty());
}
