use crate::error::{MvqError, MvqResult};
use crate::query::ParsedQuery;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// SQL 파서 — sqlparser-rs
///
/// The bridge itself only consumes [`ParsedQuery`]; this helper exists for callers
/// that hold raw statement text.
pub struct SqlParser {
    dialect: GenericDialect,
}

impl SqlParser {
    /// 새 SQL 파서 생성
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }

    /// SQL 문자열을 AST로 파싱
    pub fn parse(&self, sql: &str) -> MvqResult<Vec<Statement>> {
        Parser::parse_sql(&self.dialect, sql).map_err(|e| MvqError::SqlParse {
            message: e.to_string(),
            sql: sql.to_string(),
        })
    }

    /// Parse exactly one SELECT statement into a [`ParsedQuery`].
    pub fn parse_query(&self, sql: &str) -> MvqResult<ParsedQuery> {
        let statements = self.parse(sql)?;
        match statements.as_slice() {
            [statement] => ParsedQuery::from_statement(statement),
            _ => Err(MvqError::SqlParse {
                message: format!("expected one statement, found {}", statements.len()),
                sql: sql.to_string(),
            }),
        }
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_select() {
        let parser = SqlParser::new();
        let statements = parser.parse("SELECT * FROM MATVIEW;").unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Statement::Query(_)));
    }

    #[test]
    fn test_parse_query_single_statement_only() {
        let parser = SqlParser::new();
        let err = parser
            .parse_query("SELECT * FROM a; SELECT * FROM b;")
            .unwrap_err();
        assert!(matches!(err, MvqError::SqlParse { .. }));
    }

    #[test]
    fn test_parse_invalid_sql() {
        let parser = SqlParser::new();
        let err = parser.parse_query("SELECT * FROM").unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("SELECT * FROM"));
    }
}
