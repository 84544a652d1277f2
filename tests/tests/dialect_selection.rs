use stepwise::{Direction, MigrationStep};
use tests::ScriptedConnection;

fn step() -> MigrationStep {
    MigrationStep::new(1703423944296, "AlterTableOrganizationTeamEmployee")
        .mysql(
            ["ALTER TABLE `organization_team_employee` ADD `isManager` tinyint NOT NULL DEFAULT 0"],
            ["ALTER TABLE `organization_team_employee` DROP COLUMN `isManager`"],
        )
        .postgresql(
            [r#"ALTER TABLE "organization_team_employee" ADD "isManager" boolean NOT NULL DEFAULT false"#],
            [r#"ALTER TABLE "organization_team_employee" DROP COLUMN "isManager""#],
        )
        .sqlite(
            [r#"ALTER TABLE "organization_team_employee" ADD COLUMN "isManager" boolean NOT NULL DEFAULT (0)"#],
            [r#"ALTER TABLE "organization_team_employee" DROP COLUMN "isManager""#],
        )
}

#[tokio::test]
async fn each_engine_kind_runs_only_its_branch() {
    let step = step();

    for (engine_kind, marker) in [
        ("mysql", "`isManager`"),
        ("postgres", "DEFAULT false"),
        ("postgresql", "DEFAULT false"),
        ("sqlite", "DEFAULT (0)"),
        ("better-sqlite3", "DEFAULT (0)"),
    ] {
        let mut conn = ScriptedConnection::new(engine_kind);
        let log = conn.exec_log();

        step.up(&mut conn).await.unwrap();

        let statements = log.statements();
        assert_eq!(statements.len(), 1, "engine_kind={engine_kind}");
        assert!(
            statements[0].contains(marker),
            "engine_kind={engine_kind}; sql={}",
            statements[0]
        );
    }
}

#[tokio::test]
async fn down_uses_the_same_branch() {
    let mut conn = ScriptedConnection::new("postgres");
    let log = conn.exec_log();

    step().down(&mut conn).await.unwrap();
    assert_eq!(
        log.statements(),
        [r#"ALTER TABLE "organization_team_employee" DROP COLUMN "isManager""#]
    );
}

#[tokio::test]
async fn unsupported_engine_kind_executes_nothing() {
    for engine_kind in ["mongodb", "oracle", "mssql", "mariadb", "MySQL", ""] {
        let mut conn = ScriptedConnection::new(engine_kind);
        let log = conn.exec_log();

        for direction in [Direction::Up, Direction::Down] {
            let err = step().run(&mut conn, direction).await.unwrap_err();
            assert!(err.is_unsupported_dialect());
            assert_eq!(err.to_string(), format!("unsupported database: {engine_kind}"));
        }

        assert!(log.is_empty());
    }
}

#[tokio::test]
async fn not_applicable_branch_is_a_no_op() {
    let step = MigrationStep::new(1680071714132, "AddMysqlFullTextIndex").mysql(
        ["CREATE FULLTEXT INDEX `IDX_tag_name` ON `tag` (`name`)"],
        ["DROP INDEX `IDX_tag_name` ON `tag`"],
    );

    let mut conn = ScriptedConnection::new("sqlite");
    let log = conn.exec_log();

    step.up(&mut conn).await.unwrap();
    step.down(&mut conn).await.unwrap();
    assert!(log.is_empty());
}
