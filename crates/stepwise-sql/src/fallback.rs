use crate::parser_dialect;

use sqlparser::tokenizer::{Token, Tokenizer, Word};
use stepwise_core::Dialect;

/// MySQL statements the parser does not read, recognized at the token level.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Op {
    /// `ALTER TABLE <table> DROP FOREIGN KEY <name>`
    DropForeignKey { table: String, name: String },

    /// `DROP INDEX <name> ON <table>`
    DropIndexOn { name: String, table: String },
}

pub(crate) fn parse(dialect: Dialect, sql: &str) -> Option<Op> {
    let parser_dialect = parser_dialect(dialect);
    let tokens = Tokenizer::new(&*parser_dialect, sql).tokenize().ok()?;

    let mut words = Vec::new();
    for token in tokens {
        match token {
            Token::Whitespace(_) | Token::SemiColon => {}
            Token::Word(word) => words.push(word),
            _ => return None,
        }
    }

    match words.as_slice() {
        [alter, table_kw, table, drop, foreign, key, name]
            if keyword(alter, "ALTER")
                && keyword(table_kw, "TABLE")
                && keyword(drop, "DROP")
                && keyword(foreign, "FOREIGN")
                && keyword(key, "KEY") =>
        {
            Some(Op::DropForeignKey {
                table: table.value.to_lowercase(),
                name: name.value.to_lowercase(),
            })
        }
        [drop, index_kw, name, on, table]
            if keyword(drop, "DROP") && keyword(index_kw, "INDEX") && keyword(on, "ON") =>
        {
            Some(Op::DropIndexOn {
                name: name.value.to_lowercase(),
                table: table.value.to_lowercase(),
            })
        }
        _ => None,
    }
}

fn keyword(word: &Word, expected: &str) -> bool {
    word.quote_style.is_none() && word.value.eq_ignore_ascii_case(expected)
}
