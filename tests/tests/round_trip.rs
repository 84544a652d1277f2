use pretty_assertions::assert_eq;
use stepwise::MigrationStep;
use stepwise_driver_sqlite::Connection;
use tests::schema;

fn alter_organization_team_employee() -> MigrationStep {
    MigrationStep::new(1703423944296, "AlterTableOrganizationTeamEmployee").sqlite(
        [
            r#"CREATE TABLE "temporary_organization_team_employee" ("id" varchar PRIMARY KEY NOT NULL, "organizationTeamId" varchar NOT NULL, "employeeId" varchar NOT NULL, "isManager" boolean NOT NULL DEFAULT (0), CONSTRAINT "FK_organization_team" FOREIGN KEY ("organizationTeamId") REFERENCES "organization_team" ("id") ON DELETE CASCADE)"#,
            r#"INSERT INTO "temporary_organization_team_employee"("id", "organizationTeamId", "employeeId") SELECT "id", "organizationTeamId", "employeeId" FROM "organization_team_employee""#,
            r#"DROP TABLE "organization_team_employee""#,
            r#"ALTER TABLE "temporary_organization_team_employee" RENAME TO "organization_team_employee""#,
            r#"CREATE INDEX "IDX_organization_team_employee_manager" ON "organization_team_employee" ("isManager")"#,
        ],
        [
            r#"DROP INDEX "IDX_organization_team_employee_manager""#,
            r#"ALTER TABLE "organization_team_employee" RENAME TO "temporary_organization_team_employee""#,
            r#"CREATE TABLE "organization_team_employee" ("id" varchar PRIMARY KEY NOT NULL, "organizationTeamId" varchar NOT NULL, "employeeId" varchar NOT NULL, CONSTRAINT "FK_organization_team" FOREIGN KEY ("organizationTeamId") REFERENCES "organization_team" ("id") ON DELETE CASCADE)"#,
            r#"INSERT INTO "organization_team_employee"("id", "organizationTeamId", "employeeId") SELECT "id", "organizationTeamId", "employeeId" FROM "temporary_organization_team_employee""#,
            r#"DROP TABLE "temporary_organization_team_employee""#,
        ],
    )
}

async fn baseline() -> Connection {
    let conn = Connection::in_memory().unwrap();
    conn.as_rusqlite()
        .execute_batch(
            r#"
            CREATE TABLE "organization_team" ("id" varchar PRIMARY KEY NOT NULL, "name" varchar NOT NULL);
            CREATE TABLE "organization_team_employee" ("id" varchar PRIMARY KEY NOT NULL, "organizationTeamId" varchar NOT NULL, "employeeId" varchar NOT NULL, CONSTRAINT "FK_organization_team" FOREIGN KEY ("organizationTeamId") REFERENCES "organization_team" ("id") ON DELETE CASCADE);
            INSERT INTO "organization_team" VALUES ('t1', 'Platform');
            INSERT INTO "organization_team_employee" VALUES ('e1', 't1', 'emp1');
            "#,
        )
        .unwrap();
    conn
}

#[tokio::test]
async fn up_then_down_restores_the_schema() {
    let mut conn = baseline().await;
    let before = schema(&conn);

    let step = alter_organization_team_employee();
    step.up(&mut conn).await.unwrap();

    let applied = schema(&conn);
    assert_ne!(applied, before);
    assert!(applied
        .iter()
        .any(|entry| entry.name == "IDX_organization_team_employee_manager"));

    step.down(&mut conn).await.unwrap();
    assert_eq!(schema(&conn), before);

    // Rows survive the table rebuilds
    let employees: i64 = conn
        .as_rusqlite()
        .query_row(
            r#"SELECT count(*) FROM "organization_team_employee""#,
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(employees, 1);
}

#[tokio::test]
async fn better_sqlite3_runs_the_sqlite_branch() {
    let mut conn = baseline().await.with_engine_kind("better-sqlite3");
    let before = schema(&conn);

    let step = alter_organization_team_employee();
    step.up(&mut conn).await.unwrap();
    step.down(&mut conn).await.unwrap();

    assert_eq!(schema(&conn), before);
}
