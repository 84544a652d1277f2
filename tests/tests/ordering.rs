use stepwise::{Dialect, MigrationStep};
use stepwise_sql::{verify_round_trip, SchemaModel};

const CREATE_ORGANIZATION: &str = "CREATE TABLE `organization` (`id` varchar(36) NOT NULL, `name` varchar(255) NOT NULL, PRIMARY KEY (`id`)) ENGINE=InnoDB";
const CREATE_EMPLOYEE: &str = "CREATE TABLE `employee` (`id` varchar(36) NOT NULL, `organizationId` varchar(36) NOT NULL, PRIMARY KEY (`id`)) ENGINE=InnoDB";
const ADD_FK: &str = "ALTER TABLE `employee` ADD CONSTRAINT `FK_employee_organization` FOREIGN KEY (`organizationId`) REFERENCES `organization`(`id`) ON DELETE CASCADE";
const DROP_FK: &str = "ALTER TABLE `employee` DROP FOREIGN KEY `FK_employee_organization`";

fn step(down: [&'static str; 3]) -> MigrationStep {
    MigrationStep::new(1703423944296, "CreateOrganizationAndEmployee")
        .mysql([CREATE_ORGANIZATION, CREATE_EMPLOYEE, ADD_FK], down)
}

#[test]
fn dropping_dependents_first_is_accepted() {
    let step = step([DROP_FK, "DROP TABLE `employee`", "DROP TABLE `organization`"]);
    verify_round_trip(&step, Dialect::Mysql, &SchemaModel::new()).unwrap();
}

#[test]
fn dropping_the_referenced_table_first_is_rejected() {
    let step = step(["DROP TABLE `organization`", DROP_FK, "DROP TABLE `employee`"]);

    let err = verify_round_trip(&step, Dialect::Mysql, &SchemaModel::new()).unwrap_err();
    assert!(err.is_verification_failed());
    assert!(err.to_string().contains("(mysql down #1)"));
    assert!(err.to_string().contains("cannot drop table `organization`"));
}

#[test]
fn other_dialects_are_not_checked_against_the_mysql_branch() {
    let step = step(["DROP TABLE `organization`", DROP_FK, "DROP TABLE `employee`"]);

    for dialect in [Dialect::Postgresql, Dialect::Sqlite] {
        let report = verify_round_trip(&step, dialect, &SchemaModel::new()).unwrap();
        assert_eq!(report.modeled, 0);
    }
}
