//! Parsed-query input and store-query rewriting.
//!
//! [`ParsedQuery`] is the narrow view of a `sqlparser` AST that the bridge needs:
//! the FROM source, the projection list and whether a predicate is present.

pub mod parser;
pub mod rewriter;
pub(crate) mod text;

pub use parser::SqlParser;
pub use rewriter::QueryRewriter;

use crate::error::{MvqError, MvqResult};
use sqlparser::ast::{Expr, Query, SelectItem, SetExpr, Statement, TableFactor};

/// FROM 절: 소스 이름과 선택적 별칭
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromClause {
    pub source: String,
    pub alias: Option<String>,
}

impl FromClause {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A single projected column with an optional output alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedColumn {
    pub column: String,
    pub alias: Option<String>,
}

impl SelectedColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: None,
        }
    }

    pub fn aliased(column: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name of the column in the result set: the alias if given, else the column.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `SELECT *`
    All,
    Columns(Vec<SelectedColumn>),
}

impl Projection {
    pub fn is_all(&self) -> bool {
        matches!(self, Projection::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub from: Option<FromClause>,
    pub projection: Projection,
    pub has_where: bool,
}

impl ParsedQuery {
    pub fn new(from: FromClause, projection: Projection) -> Self {
        Self {
            from: Some(from),
            projection,
            has_where: false,
        }
    }

    pub fn with_where(mut self, has_where: bool) -> Self {
        self.has_where = has_where;
        self
    }

    /// The FROM source, or `UnresolvedSource` when the query has none.
    pub fn source(&self) -> MvqResult<&FromClause> {
        self.from.as_ref().ok_or_else(|| {
            MvqError::UnresolvedSource("query has no FROM source".to_string())
        })
    }

    /// Build from a parsed statement. Only `SELECT` queries are accepted.
    pub fn from_statement(statement: &Statement) -> MvqResult<Self> {
        match statement {
            Statement::Query(query) => Self::from_query(query),
            other => Err(MvqError::UnsupportedQuery {
                feature: format!("statement {}", statement_kind(other)),
                hint: "Only SELECT can be served from a materialized view".to_string(),
            }),
        }
    }

    pub fn from_query(query: &Query) -> MvqResult<Self> {
        let select = match query.body.as_ref() {
            SetExpr::Select(select) => select,
            _ => {
                return Err(MvqError::UnsupportedQuery {
                    feature: "set operations and VALUES".to_string(),
                    hint: "Use a single SELECT".to_string(),
                });
            }
        };

        if select.distinct.is_some() {
            return Err(MvqError::UnsupportedQuery {
                feature: "SELECT DISTINCT".to_string(),
                hint: "Materialized views hold one row per key, drop DISTINCT".to_string(),
            });
        }

        if select.from.len() > 1 {
            return Err(MvqError::UnsupportedQuery {
                feature: "Multiple tables in FROM clause".to_string(),
                hint: "Query a single materialized view".to_string(),
            });
        }

        let from = match select.from.first() {
            None => None,
            Some(table_with_joins) => {
                if !table_with_joins.joins.is_empty() {
                    return Err(MvqError::UnsupportedQuery {
                        feature: "JOIN".to_string(),
                        hint: "Query a single materialized view".to_string(),
                    });
                }
                match &table_with_joins.relation {
                    TableFactor::Table { name, alias, .. } => Some(FromClause {
                        source: name.to_string(),
                        alias: alias.as_ref().map(|a| a.name.value.clone()),
                    }),
                    _ => {
                        return Err(MvqError::UnresolvedSource(
                            "FROM must name a source table".to_string(),
                        ));
                    }
                }
            }
        };

        Ok(Self {
            from,
            projection: plan_projection(&select.projection)?,
            has_where: select.selection.is_some(),
        })
    }
}

/// SELECT 절 → Projection
fn plan_projection(items: &[SelectItem]) -> MvqResult<Projection> {
    let mut columns = Vec::with_capacity(items.len());
    let mut wildcard = false;

    for item in items {
        match item {
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => wildcard = true,
            SelectItem::UnnamedExpr(expr) => columns.push(SelectedColumn::new(column_name(expr)?)),
            SelectItem::ExprWithAlias { expr, alias } => {
                columns.push(SelectedColumn::aliased(column_name(expr)?, alias.value.clone()))
            }
        }
    }

    match (wildcard, columns.is_empty()) {
        (true, true) => Ok(Projection::All),
        (false, false) => Ok(Projection::Columns(columns)),
        (true, false) => Err(MvqError::UnsupportedQuery {
            feature: "wildcard mixed with named columns".to_string(),
            hint: "Use either SELECT * or an explicit column list".to_string(),
        }),
        (false, true) => Err(MvqError::UnsupportedQuery {
            feature: "empty projection".to_string(),
            hint: "Select at least one column".to_string(),
        }),
    }
}

fn column_name(expr: &Expr) -> MvqResult<String> {
    match expr {
        Expr::Identifier(ident) => Ok(ident.value.clone()),
        // `M.COL0` → `COL0`
        Expr::CompoundIdentifier(idents) => idents
            .last()
            .map(|i| i.value.clone())
            .ok_or_else(|| MvqError::UnresolvedSource("empty column reference".to_string())),
        other => Err(MvqError::UnsupportedQuery {
            feature: format!("projection expression '{}'", other),
            hint: "Only plain column references can be read from the store".to_string(),
        }),
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Insert { .. } => "INSERT",
        Statement::Update { .. } => "UPDATE",
        Statement::Delete { .. } => "DELETE",
        Statement::CreateTable { .. } => "CREATE TABLE",
        Statement::Drop { .. } => "DROP",
        _ => "other than SELECT",
    }
}
