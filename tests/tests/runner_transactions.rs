use stepwise::{Connection as _, MigrationStep, Migrator};
use tests::ScriptedConnection;

const ADD_MANAGER_FLAG: &str =
    "ALTER TABLE `organization_team_employee` ADD `isManager` tinyint NOT NULL DEFAULT 0";
const ADD_ROLE: &str = "ALTER TABLE `organization_team_employee` ADD `roleId` varchar(36) NULL";
const ADD_ROLE_FK: &str = "ALTER TABLE `organization_team_employee` ADD CONSTRAINT `FK_organization_team_employee_role` FOREIGN KEY (`roleId`) REFERENCES `role`(`id`)";
const ADD_ROLE_INDEX: &str =
    "CREATE INDEX `IDX_organization_team_employee_roleId` ON `organization_team_employee` (`roleId`)";

fn migrator() -> Migrator {
    Migrator::new([
        MigrationStep::new(1680071714132, "AddManagerFlag").mysql(
            [ADD_MANAGER_FLAG],
            ["ALTER TABLE `organization_team_employee` DROP COLUMN `isManager`"],
        ),
        MigrationStep::new(1703423944296, "AddEmployeeRole").mysql(
            [ADD_ROLE, ADD_ROLE_FK, ADD_ROLE_INDEX],
            [
                "DROP INDEX `IDX_organization_team_employee_roleId` ON `organization_team_employee`",
                "ALTER TABLE `organization_team_employee` DROP FOREIGN KEY `FK_organization_team_employee_role`",
                "ALTER TABLE `organization_team_employee` DROP COLUMN `roleId`",
            ],
        ),
    ])
    .unwrap()
}

#[tokio::test]
async fn mysql_steps_run_without_a_transaction() {
    let migrator = migrator();
    let mut conn = ScriptedConnection::new("mysql").fail_on(ADD_ROLE_FK);
    let log = conn.exec_log();

    let err = migrator.up(&mut conn).await.unwrap_err();
    assert!(err
        .to_string()
        .starts_with("migration 1703423944296_AddEmployeeRole failed (up): rejected by script"));

    // No transaction control, and nothing after the failing statement
    assert_eq!(log.statements(), [ADD_MANAGER_FLAG, ADD_ROLE, ADD_ROLE_FK]);
    assert_eq!(log.failures(), [ADD_ROLE_FK]);

    // Only the step that completed is in the ledger
    let ledger: Vec<_> = conn
        .applied_migrations()
        .await
        .unwrap()
        .iter()
        .map(|migration| migration.id())
        .collect();
    assert_eq!(ledger, [1680071714132]);
}

#[tokio::test]
async fn transactional_engines_wrap_each_step() {
    let migrator = Migrator::new([MigrationStep::new(1680071714132, "CreateTag").postgresql(
        [
            r#"CREATE TABLE "tag" ("id" uuid NOT NULL, CONSTRAINT "PK_tag" PRIMARY KEY ("id"))"#,
            r#"CREATE INDEX "IDX_tag_id" ON "tag" ("id")"#,
        ],
        [r#"DROP INDEX "public"."IDX_tag_id""#, r#"DROP TABLE "tag""#],
    )])
    .unwrap();

    let mut conn = ScriptedConnection::new("postgres")
        .fail_on(r#"CREATE INDEX "IDX_tag_id" ON "tag" ("id")"#);
    let log = conn.exec_log();

    migrator.up(&mut conn).await.unwrap_err();

    assert_eq!(
        log.statements(),
        [
            "BEGIN",
            r#"CREATE TABLE "tag" ("id" uuid NOT NULL, CONSTRAINT "PK_tag" PRIMARY KEY ("id"))"#,
            r#"CREATE INDEX "IDX_tag_id" ON "tag" ("id")"#,
            "ROLLBACK",
        ]
    );
    assert!(conn.applied_migrations().await.unwrap().is_empty());
}
