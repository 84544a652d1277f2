use stepwise::{Connection as _, MigrationStep};
use stepwise_driver_sqlite::Connection;
use tests::{LoggingConnection, ScriptedConnection};

#[tokio::test]
async fn later_statements_are_not_sent() {
    let step = MigrationStep::new(1680071714132, "CreateIssueTypeTable").postgresql(
        [
            r#"CREATE TABLE "issue_type" ("id" uuid NOT NULL DEFAULT gen_random_uuid(), "name" character varying NOT NULL, CONSTRAINT "PK_issue_type" PRIMARY KEY ("id"))"#,
            r#"CREATE INDEX "IDX_issue_type_name" ON "issue_type" ("name")"#,
            r#"ALTER TABLE "issue_type" ADD CONSTRAINT "FK_issue_type_image" FOREIGN KEY ("imageId") REFERENCES "image_asset"("id")"#,
        ],
        [
            r#"DROP INDEX "public"."IDX_issue_type_name""#,
            r#"DROP TABLE "issue_type""#,
        ],
    );

    let mut conn = ScriptedConnection::new("postgres")
        .fail_on(r#"CREATE INDEX "IDX_issue_type_name" ON "issue_type" ("name")"#);
    let log = conn.exec_log();

    let err = step.up(&mut conn).await.unwrap_err();
    assert!(err.is_driver_operation_failed());
    assert!(err.to_string().contains("rejected by script"));

    // The failing statement was the last one sent
    assert_eq!(log.len(), 2);
    assert_eq!(log.failures().len(), 1);
    assert!(!log.statements().iter().any(|sql| sql.contains("FK_issue_type_image")));
}

#[tokio::test]
async fn driver_error_is_returned_unchanged() {
    let step = MigrationStep::new(1, "AddColumnToMissingTable").sqlite(
        [
            "CREATE TABLE tag (id varchar PRIMARY KEY NOT NULL)",
            "ALTER TABLE missing ADD COLUMN name varchar",
            "CREATE TABLE never_created (id varchar PRIMARY KEY NOT NULL)",
        ],
        Vec::<&str>::new(),
    );

    let mut conn = LoggingConnection::new(Box::new(Connection::in_memory().unwrap()));
    let log = conn.exec_log();

    let err = step.up(&mut conn).await.unwrap_err();
    assert!(err.is_driver_operation_failed());
    assert!(err.to_string().contains("no such table: missing"));

    assert_eq!(
        log.statements(),
        [
            "CREATE TABLE tag (id varchar PRIMARY KEY NOT NULL)",
            "ALTER TABLE missing ADD COLUMN name varchar",
        ]
    );
    assert_eq!(log.failures(), ["ALTER TABLE missing ADD COLUMN name varchar"]);

    // Not wrapped in a transaction at this level, so the first table remains
    let err = conn
        .exec("CREATE TABLE tag (id varchar PRIMARY KEY NOT NULL)")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}
