//! Keyword scanning over statement text
//!
//! Keywords are ASCII, so the scan works on bytes: text inside single-quoted
//! literals and double-quoted identifiers is skipped, and a match must sit on
//! identifier boundaries. Returned offsets are always char boundaries.

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Byte offset of the first top-level occurrence of `keyword` (case-insensitive).
pub(crate) fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    find_keyword_from(text, keyword, 0)
}

pub(crate) fn find_keyword_from(text: &str, keyword: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let kw = keyword.as_bytes();
    if kw.is_empty() || bytes.len() < kw.len() {
        return None;
    }

    let mut in_literal = false;
    let mut in_quoted_ident = false;
    let mut i = 0;
    while i + kw.len() <= bytes.len() {
        let b = bytes[i];
        // '' inside a literal toggles twice and stays inside.
        if b == b'\'' && !in_quoted_ident {
            in_literal = !in_literal;
        } else if b == b'"' && !in_literal {
            in_quoted_ident = !in_quoted_ident;
        } else if i >= start
            && !in_literal
            && !in_quoted_ident
            && bytes[i..i + kw.len()].eq_ignore_ascii_case(kw)
            && (i == 0 || !is_ident_byte(bytes[i - 1]))
            && bytes.get(i + kw.len()).is_none_or(|next| !is_ident_byte(*next))
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Length of the identifier token (`a-z0-9_`, dotted parts allowed) at the start of `text`.
pub(crate) fn ident_len(text: &str) -> usize {
    text.bytes()
        .take_while(|b| is_ident_byte(*b) || *b == b'.')
        .count()
}

/// Byte length of the leading whitespace of `text`.
pub(crate) fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_keyword_respects_boundaries() {
        let sql = "SELECT WHEREVER FROM T WHERE A=1";
        assert_eq!(find_keyword(sql, "where"), Some(23));
        assert_eq!(find_keyword(sql, "FROM"), Some(16));
        assert_eq!(find_keyword("SELECT * FROMAGE", "FROM"), None);
    }

    #[test]
    fn test_find_keyword_skips_literals_and_quoted_idents() {
        let sql = "SELECT 'a where b', \"where\" FROM t WHERE x = 'it''s'";
        let idx = find_keyword(sql, "WHERE").unwrap();
        assert_eq!(&sql[idx..idx + 5], "WHERE");
        assert!(sql[..idx].ends_with("FROM t "));
    }

    #[test]
    fn test_find_keyword_from_offset() {
        let sql = "SELECT a FROM (SELECT b FROM c)";
        let first = find_keyword(sql, "FROM").unwrap();
        let second = find_keyword_from(sql, "FROM", first + 1).unwrap();
        assert!(second > first);
        assert_eq!(find_keyword_from(sql, "FROM", second + 1), None);
    }

    #[test]
    fn test_ident_len() {
        assert_eq!(ident_len("MATVIEW;"), 7);
        assert_eq!(ident_len("ks.tbl WHERE"), 6);
        assert_eq!(ident_len(";"), 0);
        assert_eq!(leading_whitespace("  \tX"), 3);
    }
}
