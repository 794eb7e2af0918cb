//! Query Rewriter — logical SELECT text → store-native query
//!
//! The statement is split into two regions at the top-level `WHERE`:
//!
//! ```text
//! SELECT * FROM matview WHERE col0 = 'a';
//! └──────── head ──────┘└─── predicate ──┘
//! ```
//!
//! The head is upper-cased, the FROM source is qualified with the physical table
//! name and, for explicit projections, the key column is prepended. The predicate
//! region is kept as written and gets the scan clause before its terminator.
//!
//! Limitation: without a `WHERE` the whole statement is the head, so string
//! literals in it are upper-cased too.

use crate::catalog::SourceTable;
use crate::config::BridgeConfig;
use crate::error::{MvqError, MvqResult};
use crate::query::text::{find_keyword, ident_len, leading_whitespace};
use crate::query::{ParsedQuery, Projection};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct QueryRewriter {
    key_column: String,
    scan_clause: String,
    inject_key_column: bool,
}

impl QueryRewriter {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            key_column: config.key_column.to_uppercase(),
            scan_clause: config.scan_clause.trim().to_string(),
            inject_key_column: config.inject_key_column,
        }
    }

    /// Rewrite `statement` so it addresses `source`'s physical table.
    pub fn rewrite(
        &self,
        statement: &str,
        query: &ParsedQuery,
        source: &SourceTable,
    ) -> MvqResult<String> {
        let from = query.source()?;

        let (head, predicate) = if query.has_where {
            let idx = find_keyword(statement, "WHERE").ok_or_else(|| MvqError::UnsupportedQuery {
                feature: "predicate outside the statement text".to_string(),
                hint: "The parsed query has a WHERE clause the text does not contain".to_string(),
            })?;
            (&statement[..idx], Some(&statement[idx..]))
        } else {
            (statement, None)
        };

        let mut head = head.to_uppercase();
        self.qualify_source(&mut head, &from.source, &source.physical_name)?;
        if let Projection::Columns(columns) = &query.projection {
            let key_projected = columns
                .iter()
                .any(|c| c.column.eq_ignore_ascii_case(&self.key_column));
            if self.inject_key_column && !key_projected {
                self.inject_key(&mut head)?;
            }
        }

        let rewritten = match predicate {
            Some(predicate) => head + &self.with_scan_clause(predicate),
            None => head,
        };
        trace!(original = statement, rewritten = %rewritten, "rewrote statement");
        Ok(rewritten)
    }

    /// `FROM MATVIEW` → `FROM MATVIEW.<physical>`
    fn qualify_source(&self, head: &mut String, source: &str, physical: &str) -> MvqResult<()> {
        let not_found = || MvqError::UnsupportedQuery {
            feature: format!("FROM source '{}' not found in statement text", source),
            hint: "Reference the source by its plain name".to_string(),
        };

        let from_idx = find_keyword(head, "FROM").ok_or_else(&not_found)?;
        let after_from = from_idx + "FROM".len();
        let token_start = after_from + leading_whitespace(&head[after_from..]);
        let token_len = ident_len(&head[token_start..]);
        let token = &head[token_start..token_start + token_len];

        if token_len == 0 || token != source.to_uppercase() {
            return Err(not_found());
        }

        let qualified = format!("{}.{}", token, physical);
        head.replace_range(token_start..token_start + token_len, &qualified);
        Ok(())
    }

    /// `SELECT a, b` → `SELECT ROWKEY, a, b`
    fn inject_key(&self, head: &mut String) -> MvqResult<()> {
        let select_idx = find_keyword(head, "SELECT").ok_or_else(|| MvqError::UnsupportedQuery {
            feature: "statement without SELECT".to_string(),
            hint: "Only SELECT can be served from a materialized view".to_string(),
        })?;
        let after_select = select_idx + "SELECT".len();
        let insert_at = after_select + leading_whitespace(&head[after_select..]);
        head.insert_str(insert_at, &format!("{}, ", self.key_column));
        Ok(())
    }

    /// `WHERE x = 1;` → `WHERE x = 1 ALLOW FILTERING;`
    fn with_scan_clause(&self, predicate: &str) -> String {
        let body = predicate.trim_end();
        match body.strip_suffix(';') {
            Some(body) => format!("{} {};", body.trim_end(), self.scan_clause),
            None => format!("{} {}", body, self.scan_clause),
        }
    }
}

impl Default for QueryRewriter {
    fn default() -> Self {
        Self::new(&BridgeConfig::default())
    }
}
