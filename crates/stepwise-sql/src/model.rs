use crate::{fallback, parser_dialect};

use indexmap::{IndexMap, IndexSet};
use sqlparser::{ast, parser::Parser};
use stepwise_core::{Dialect, Error, Result, Statement};

/// In-memory model of the schema objects migrations create and drop.
///
/// Names are compared case-insensitively and without schema qualifiers.
/// Equality ignores the order objects were created in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaModel {
    tables: IndexMap<String, Table>,
    indexes: IndexMap<String, Index>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: IndexSet<String>,

    /// Keyed by constraint name, or by a name derived from the referenced
    /// table when the constraint is unnamed.
    pub foreign_keys: IndexMap<String, ForeignKey>,

    /// Named primary key and check constraints.
    pub constraints: IndexSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub references: String,
}

/// Indexes, including the ones backing named unique constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// How a statement was handled by [`SchemaModel::replay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replayed {
    /// The statement's effect is reflected in the model.
    Modeled,

    /// The statement could not be parsed or does not touch modeled objects.
    /// The model is unchanged.
    Opaque(String),
}

enum Constraint {
    ForeignKey(ForeignKey),
    Index(Index),
    Named(String),
    Unnamed,
}

impl SchemaModel {
    pub fn new() -> SchemaModel {
        SchemaModel::default()
    }

    /// Build a model by replaying `statements` on an empty schema.
    pub fn from_statements<S: AsRef<str>>(dialect: Dialect, statements: &[S]) -> Result<SchemaModel> {
        let mut model = SchemaModel::new();
        for statement in statements {
            model.replay(dialect, &Statement::new(statement.as_ref()))?;
        }
        Ok(model)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(&name.to_lowercase())
    }

    /// Apply one statement to the model.
    ///
    /// Returns a verification error when a database would reject the
    /// statement because of the objects that exist at this point.
    pub fn replay(&mut self, dialect: Dialect, statement: &Statement) -> Result<Replayed> {
        self.apply(dialect, statement.as_str())
            .map_err(Error::verification_failed)
    }

    pub(crate) fn apply(&mut self, dialect: Dialect, sql: &str) -> Result<Replayed, String> {
        if let Some(op) = fallback::parse(dialect, sql) {
            return self.apply_fallback(op);
        }

        let parsed = match Parser::parse_sql(&*parser_dialect(dialect), sql) {
            Ok(parsed) => parsed,
            Err(err) => return Ok(Replayed::Opaque(err.to_string())),
        };

        let mut outcome = Replayed::Modeled;
        for statement in &parsed {
            if let Replayed::Opaque(reason) = self.apply_statement(statement)? {
                outcome = Replayed::Opaque(reason);
            }
        }
        Ok(outcome)
    }

    /// Describe how `other` differs from `self`, one entry per object.
    pub fn diff(&self, other: &SchemaModel) -> Vec<String> {
        let mut changes = Vec::new();

        for (name, table) in &self.tables {
            match other.tables.get(name) {
                None => changes.push(format!("missing table `{name}`")),
                Some(other) if other != table => changes.push(format!("changed table `{name}`")),
                Some(_) => {}
            }
        }
        for name in other.tables.keys() {
            if !self.tables.contains_key(name) {
                changes.push(format!("leftover table `{name}`"));
            }
        }

        for (name, index) in &self.indexes {
            match other.indexes.get(name) {
                None => changes.push(format!("missing index `{name}`")),
                Some(other) if other != index => changes.push(format!("changed index `{name}`")),
                Some(_) => {}
            }
        }
        for name in other.indexes.keys() {
            if !self.indexes.contains_key(name) {
                changes.push(format!("leftover index `{name}`"));
            }
        }

        changes
    }

    fn apply_statement(&mut self, statement: &ast::Statement) -> Result<Replayed, String> {
        match statement {
            ast::Statement::CreateTable(create) => self.create_table(create),
            ast::Statement::CreateIndex(create) => self.create_index(create),
            ast::Statement::AlterTable {
                name,
                if_exists,
                operations,
                ..
            } => self.alter_table(name, *if_exists, operations),
            ast::Statement::Drop {
                object_type: ast::ObjectType::Table,
                names,
                if_exists,
                ..
            } => {
                for name in names {
                    self.drop_table(&object_name(name), *if_exists)?;
                }
                Ok(Replayed::Modeled)
            }
            ast::Statement::Drop {
                object_type: ast::ObjectType::Index,
                names,
                if_exists,
                ..
            } => {
                for name in names {
                    self.drop_index(&object_name(name), *if_exists)?;
                }
                Ok(Replayed::Modeled)
            }
            other => Ok(Replayed::Opaque(format!(
                "statement kind is not modeled: {}",
                first_line(&other.to_string())
            ))),
        }
    }

    fn create_table(&mut self, create: &ast::CreateTable) -> Result<Replayed, String> {
        let name = object_name(&create.name);

        if self.tables.contains_key(&name) {
            if create.if_not_exists {
                return Ok(Replayed::Modeled);
            }
            return Err(format!("table `{name}` already exists"));
        }

        let mut table = Table::new(&name);
        let mut indexes = Vec::new();

        for column in &create.columns {
            let column_name = ident(&column.name);
            table.columns.insert(column_name.clone());

            for option in &column.options {
                if let ast::ColumnOption::ForeignKey { foreign_table, .. } = &option.option {
                    table.add_foreign_key(ForeignKey {
                        name: option.name.as_ref().map(ident),
                        columns: vec![column_name.clone()],
                        references: object_name(foreign_table),
                    })?;
                }
            }
        }

        for constraint in &create.constraints {
            match classify(&name, constraint) {
                Constraint::ForeignKey(fk) => table.add_foreign_key(fk)?,
                Constraint::Index(index) => indexes.push(index),
                Constraint::Named(constraint) => {
                    table.constraints.insert(constraint);
                }
                Constraint::Unnamed => {}
            }
        }

        for fk in table.foreign_keys.values() {
            self.check_reference(&name, fk)?;
        }

        for index in &indexes {
            if self.indexes.contains_key(&index.name) {
                return Err(format!("index `{}` already exists", index.name));
            }
        }

        self.tables.insert(name, table);
        for index in indexes {
            self.indexes.insert(index.name.clone(), index);
        }

        Ok(Replayed::Modeled)
    }

    fn create_index(&mut self, create: &ast::CreateIndex) -> Result<Replayed, String> {
        let Some(name) = &create.name else {
            return Ok(Replayed::Opaque("unnamed index".to_string()));
        };
        let name = object_name(name);
        let table = object_name(&create.table_name);

        let Some(target) = self.tables.get(&table) else {
            return Err(format!("cannot create index `{name}`: table `{table}` does not exist"));
        };

        if self.indexes.contains_key(&name) {
            if create.if_not_exists {
                return Ok(Replayed::Modeled);
            }
            return Err(format!("index `{name}` already exists"));
        }

        let columns: Vec<String> = create
            .columns
            .iter()
            .map(|column| expr_column(&column.expr))
            .collect();

        for column in &columns {
            if !target.columns.is_empty() && !target.columns.contains(column) {
                return Err(format!(
                    "cannot create index `{name}`: column `{column}` does not exist on `{table}`"
                ));
            }
        }

        self.indexes.insert(
            name.clone(),
            Index {
                name,
                table,
                columns,
                unique: create.unique,
            },
        );

        Ok(Replayed::Modeled)
    }

    fn alter_table(
        &mut self,
        name: &ast::ObjectName,
        if_exists: bool,
        operations: &[ast::AlterTableOperation],
    ) -> Result<Replayed, String> {
        let table = object_name(name);

        if !self.tables.contains_key(&table) {
            if if_exists {
                return Ok(Replayed::Modeled);
            }
            return Err(format!("cannot alter table `{table}`: it does not exist"));
        }

        let mut outcome = Replayed::Modeled;

        for operation in operations {
            match operation {
                ast::AlterTableOperation::AddColumn { column_def, .. } => {
                    self.add_column(&table, column_def)?;
                }
                ast::AlterTableOperation::DropColumn {
                    column_name,
                    if_exists,
                    ..
                } => {
                    self.drop_column(&table, &ident(column_name), *if_exists)?;
                }
                ast::AlterTableOperation::RenameColumn {
                    old_column_name,
                    new_column_name,
                } => {
                    self.rename_column(&table, &ident(old_column_name), &ident(new_column_name))?;
                }
                ast::AlterTableOperation::AddConstraint(constraint) => {
                    self.add_constraint(&table, constraint)?;
                }
                ast::AlterTableOperation::DropConstraint { name, if_exists, .. } => {
                    self.drop_constraint(&table, &ident(name), *if_exists)?;
                }
                ast::AlterTableOperation::RenameTable { table_name } => {
                    self.rename_table(&table, &object_name(table_name))?;
                }
                other => {
                    outcome = Replayed::Opaque(format!(
                        "alter table operation is not modeled: {other}"
                    ));
                }
            }
        }

        Ok(outcome)
    }

    fn add_column(&mut self, table: &str, column: &ast::ColumnDef) -> Result<(), String> {
        let column_name = ident(&column.name);

        let mut fks = Vec::new();
        for option in &column.options {
            if let ast::ColumnOption::ForeignKey { foreign_table, .. } = &option.option {
                let fk = ForeignKey {
                    name: option.name.as_ref().map(ident),
                    columns: vec![column_name.clone()],
                    references: object_name(foreign_table),
                };
                self.check_reference(table, &fk)?;
                fks.push(fk);
            }
        }

        let target = self.table_mut(table)?;
        if !target.columns.insert(column_name.clone()) {
            return Err(format!("column `{column_name}` already exists on `{table}`"));
        }
        for fk in fks {
            target.add_foreign_key(fk)?;
        }
        Ok(())
    }

    fn drop_column(&mut self, table: &str, column: &str, if_exists: bool) -> Result<(), String> {
        if let Some(index) = self
            .indexes
            .values()
            .find(|index| index.table == table && index.columns.iter().any(|c| c == column))
        {
            return Err(format!(
                "cannot drop column `{column}` of `{table}`: index `{}` still covers it",
                index.name
            ));
        }

        let target = self.table_mut(table)?;

        if let Some((key, _)) = target
            .foreign_keys
            .iter()
            .find(|(_, fk)| fk.columns.iter().any(|c| c == column))
        {
            return Err(format!(
                "cannot drop column `{column}` of `{table}`: foreign key `{key}` still uses it"
            ));
        }

        if !target.columns.shift_remove(column) && !if_exists {
            return Err(format!("column `{column}` does not exist on `{table}`"));
        }
        Ok(())
    }

    fn rename_column(&mut self, table: &str, from: &str, to: &str) -> Result<(), String> {
        let target = self.table_mut(table)?;
        let Some(position) = target.columns.get_index_of(from) else {
            return Err(format!("column `{from}` does not exist on `{table}`"));
        };
        if target.columns.contains(to) {
            return Err(format!("column `{to}` already exists on `{table}`"));
        }

        target.columns.shift_remove(from);
        target.columns.shift_insert(position, to.to_string());
        for fk in target.foreign_keys.values_mut() {
            rename_in(&mut fk.columns, from, to);
        }
        for index in self.indexes.values_mut().filter(|index| index.table == table) {
            rename_in(&mut index.columns, from, to);
        }
        Ok(())
    }

    fn add_constraint(&mut self, table: &str, constraint: &ast::TableConstraint) -> Result<(), String> {
        match classify(table, constraint) {
            Constraint::ForeignKey(fk) => {
                self.check_reference(table, &fk)?;
                self.table_mut(table)?.add_foreign_key(fk)
            }
            Constraint::Index(index) => {
                if self.indexes.contains_key(&index.name) {
                    return Err(format!("index `{}` already exists", index.name));
                }
                self.indexes.insert(index.name.clone(), index);
                Ok(())
            }
            Constraint::Named(name) => {
                if !self.table_mut(table)?.constraints.insert(name.clone()) {
                    return Err(format!("constraint `{name}` already exists on `{table}`"));
                }
                Ok(())
            }
            Constraint::Unnamed => Ok(()),
        }
    }

    fn drop_constraint(&mut self, table: &str, name: &str, if_exists: bool) -> Result<(), String> {
        let is_index = self
            .indexes
            .get(name)
            .is_some_and(|index| index.table == table);
        if is_index {
            self.indexes.shift_remove(name);
            return Ok(());
        }

        let target = self.table_mut(table)?;
        if target.foreign_keys.shift_remove(name).is_some() || target.constraints.shift_remove(name)
        {
            return Ok(());
        }

        if if_exists {
            return Ok(());
        }
        Err(format!("constraint `{name}` does not exist on `{table}`"))
    }

    fn drop_foreign_key(&mut self, table: &str, name: &str) -> Result<(), String> {
        if self.table_mut(table)?.foreign_keys.shift_remove(name).is_none() {
            return Err(format!("foreign key `{name}` does not exist on `{table}`"));
        }
        Ok(())
    }

    fn rename_table(&mut self, from: &str, to: &str) -> Result<(), String> {
        if self.tables.contains_key(to) {
            return Err(format!("cannot rename `{from}` to `{to}`: table `{to}` already exists"));
        }

        let Some(mut table) = self.tables.shift_remove(from) else {
            return Err(format!("table `{from}` does not exist"));
        };
        table.name = to.to_string();
        self.tables.insert(to.to_string(), table);

        for table in self.tables.values_mut() {
            for fk in table.foreign_keys.values_mut() {
                if fk.references == from {
                    fk.references = to.to_string();
                }
            }
        }
        for index in self.indexes.values_mut() {
            if index.table == from {
                index.table = to.to_string();
            }
        }
        Ok(())
    }

    fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<(), String> {
        if !self.tables.contains_key(name) {
            if if_exists {
                return Ok(());
            }
            return Err(format!("cannot drop table `{name}`: it does not exist"));
        }

        for table in self.tables.values().filter(|table| table.name != name) {
            if let Some((key, _)) = table
                .foreign_keys
                .iter()
                .find(|(_, fk)| fk.references == name)
            {
                return Err(format!(
                    "cannot drop table `{name}`: foreign key `{key}` on `{}` still references it",
                    table.name
                ));
            }
        }

        self.tables.shift_remove(name);
        self.indexes.retain(|_, index| index.table != name);
        Ok(())
    }

    fn drop_index(&mut self, name: &str, if_exists: bool) -> Result<(), String> {
        if self.indexes.shift_remove(name).is_none() && !if_exists {
            return Err(format!("cannot drop index `{name}`: it does not exist"));
        }
        Ok(())
    }

    fn apply_fallback(&mut self, op: fallback::Op) -> Result<Replayed, String> {
        match op {
            fallback::Op::DropForeignKey { table, name } => {
                self.drop_foreign_key(&table, &name)?;
            }
            fallback::Op::DropIndexOn { name, table } => {
                if let Some(index) = self.indexes.get(&name) {
                    if index.table != table {
                        return Err(format!(
                            "cannot drop index `{name}` on `{table}`: it belongs to `{}`",
                            index.table
                        ));
                    }
                }
                self.drop_index(&name, false)?;
            }
        }
        Ok(Replayed::Modeled)
    }

    fn check_reference(&self, table: &str, fk: &ForeignKey) -> Result<(), String> {
        if fk.references != table && !self.tables.contains_key(&fk.references) {
            return Err(format!(
                "foreign key `{}` on `{table}` references missing table `{}`",
                fk.key(),
                fk.references
            ));
        }
        Ok(())
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, String> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| format!("table `{name}` does not exist"))
    }
}

impl Table {
    fn new(name: &str) -> Table {
        Table {
            name: name.to_string(),
            columns: IndexSet::new(),
            foreign_keys: IndexMap::new(),
            constraints: IndexSet::new(),
        }
    }

    fn add_foreign_key(&mut self, fk: ForeignKey) -> Result<(), String> {
        let key = fk.key();
        if self.foreign_keys.contains_key(&key) {
            return Err(format!(
                "foreign key `{key}` already exists on `{}`",
                self.name
            ));
        }
        self.foreign_keys.insert(key, fk);
        Ok(())
    }
}

impl ForeignKey {
    fn key(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}({})", self.references, self.columns.join(", ")),
        }
    }
}

fn classify(table: &str, constraint: &ast::TableConstraint) -> Constraint {
    match constraint {
        ast::TableConstraint::ForeignKey {
            name,
            columns,
            foreign_table,
            ..
        } => Constraint::ForeignKey(ForeignKey {
            name: name.as_ref().map(ident),
            columns: columns.iter().map(ident).collect(),
            references: object_name(foreign_table),
        }),
        ast::TableConstraint::Unique {
            name: Some(name),
            columns,
            ..
        } => Constraint::Index(Index {
            name: ident(name),
            table: table.to_string(),
            columns: columns.iter().map(ident).collect(),
            unique: true,
        }),
        ast::TableConstraint::Index {
            name: Some(name),
            columns,
            ..
        } => Constraint::Index(Index {
            name: ident(name),
            table: table.to_string(),
            columns: columns.iter().map(ident).collect(),
            unique: false,
        }),
        ast::TableConstraint::PrimaryKey { name: Some(name), .. }
        | ast::TableConstraint::Check { name: Some(name), .. } => Constraint::Named(ident(name)),
        _ => Constraint::Unnamed,
    }
}

fn rename_in(columns: &mut [String], from: &str, to: &str) {
    for column in columns.iter_mut().filter(|column| *column == from) {
        *column = to.to_string();
    }
}

fn expr_column(expr: &ast::Expr) -> String {
    match expr {
        ast::Expr::Identifier(column) => ident(column),
        ast::Expr::CompoundIdentifier(parts) => parts.last().map(ident).unwrap_or_default(),
        other => other.to_string().to_lowercase(),
    }
}

pub(crate) fn object_name(name: &ast::ObjectName) -> String {
    name.0.last().map(ident).unwrap_or_default()
}

pub(crate) fn ident(ident: &ast::Ident) -> String {
    ident.value.to_lowercase()
}

fn first_line(sql: &str) -> &str {
    sql.lines().next().unwrap_or_default()
}
