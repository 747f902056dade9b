//! SQL write-operation detection.
//!
//! [`WriteDetector`] is a lexical guard, not a parser. It tokenizes the input,
//! splits it on `;`, and looks at the effective leading verb of every segment
//! after skipping comments, wrapping parentheses, `WITH` prefixes and
//! `EXPLAIN` options. Anything it cannot recognize is reported as a write.

use crate::dialect::SqlDialect;
use serde::{Deserialize, Serialize};
use sqlparser::tokenizer::{Token, Whitespace};
use std::fmt;

/// Nesting limit for `WITH`/`EXPLAIN` resolution. Deeper input is a write.
const MAX_NESTING: usize = 64;

/// The kind of statement a segment was resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    Select,
    Show,
    Describe,
    Explain,
    Values,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    Truncate,
    Merge,
    Grant,
    Revoke,
    Call,
    /// Nothing to execute.
    Empty,
    /// Leading token not recognized, or text that could not be lexed.
    Unknown,
}

/// Leading keywords that mutate schema, data or privileges.
const MUTATING: &[(&str, StatementType)] = &[
    ("INSERT", StatementType::Insert),
    ("UPDATE", StatementType::Update),
    ("DELETE", StatementType::Delete),
    ("CREATE", StatementType::Create),
    ("DROP", StatementType::Drop),
    ("ALTER", StatementType::Alter),
    ("TRUNCATE", StatementType::Truncate),
    ("MERGE", StatementType::Merge),
    ("GRANT", StatementType::Grant),
    ("REVOKE", StatementType::Revoke),
    ("CALL", StatementType::Call),
];

/// Leading keywords that only read.
const READ_ONLY: &[(&str, StatementType)] = &[
    ("SELECT", StatementType::Select),
    ("SHOW", StatementType::Show),
    ("DESCRIBE", StatementType::Describe),
    ("DESC", StatementType::Describe),
    ("VALUES", StatementType::Values),
];

impl StatementType {
    /// Whether executing this kind of statement can mutate state.
    ///
    /// `Unknown` counts as a write; `Empty` does not.
    pub fn is_write(self) -> bool {
        !matches!(
            self,
            StatementType::Select
                | StatementType::Show
                | StatementType::Describe
                | StatementType::Explain
                | StatementType::Values
                | StatementType::Empty
        )
    }

    fn mutating(keyword: &str) -> Option<StatementType> {
        lookup(MUTATING, keyword)
    }

    fn read_only(keyword: &str) -> Option<StatementType> {
        lookup(READ_ONLY, keyword)
    }
}

fn lookup(table: &[(&str, StatementType)], keyword: &str) -> Option<StatementType> {
    table
        .iter()
        .find(|(kw, _)| *kw == keyword)
        .map(|(_, ty)| *ty)
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementType::Select => "SELECT",
            StatementType::Show => "SHOW",
            StatementType::Describe => "DESCRIBE",
            StatementType::Explain => "EXPLAIN",
            StatementType::Values => "VALUES",
            StatementType::Insert => "INSERT",
            StatementType::Update => "UPDATE",
            StatementType::Delete => "DELETE",
            StatementType::Create => "CREATE",
            StatementType::Drop => "DROP",
            StatementType::Alter => "ALTER",
            StatementType::Truncate => "TRUNCATE",
            StatementType::Merge => "MERGE",
            StatementType::Grant => "GRANT",
            StatementType::Revoke => "REVOKE",
            StatementType::Call => "CALL",
            StatementType::Empty => "EMPTY",
            StatementType::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Classification of one `;`-separated segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentClassification {
    /// Resolved statement kind (the tail verb for `WITH`).
    pub statement_type: StatementType,
    /// First keyword of the segment after comments and parentheses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading_keyword: Option<String>,
    /// Whether the segment can mutate state.
    pub contains_write: bool,
    /// Keyword that made the segment a write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
}

/// Outcome of classifying one SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// True if any segment can mutate state.
    pub contains_write: bool,
    /// Keyword that triggered the write classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
    /// Kind of the deciding segment: the first write, else the first statement.
    pub statement_type: StatementType,
    /// Per-segment evidence, in input order.
    #[serde(default)]
    pub statements: Vec<SegmentClassification>,
}

impl DetectionResult {
    /// True when the text is safe for a read-only channel.
    pub fn is_read_only(&self) -> bool {
        !self.contains_write
    }

    fn empty() -> Self {
        Self {
            contains_write: false,
            matched_keyword: None,
            statement_type: StatementType::Empty,
            statements: Vec::new(),
        }
    }

    fn unknown() -> Self {
        Self {
            contains_write: true,
            matched_keyword: None,
            statement_type: StatementType::Unknown,
            statements: Vec::new(),
        }
    }

    fn from_segments(statements: Vec<SegmentClassification>) -> Self {
        let deciding = statements
            .iter()
            .find(|s| s.contains_write)
            .or_else(|| statements.first())
            .map(|seg| (seg.contains_write, seg.matched_keyword.clone(), seg.statement_type));

        match deciding {
            Some((contains_write, matched_keyword, statement_type)) => Self {
                contains_write,
                matched_keyword,
                statement_type,
                statements,
            },
            None => Self::empty(),
        }
    }
}

/// Classifies SQL text as read-only or write-capable.
///
/// Stateless; a single instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteDetector {
    dialect: SqlDialect,
}

impl WriteDetector {
    /// Create a detector that tokenizes with the default (Snowflake) dialect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector for a specific dialect.
    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// The canonical set of mutating leading keywords.
    pub fn mutating_keywords() -> impl Iterator<Item = &'static str> {
        MUTATING.iter().map(|(kw, _)| *kw)
    }

    /// Classify `sql`. Never fails: input that cannot be understood is
    /// reported as a write.
    pub fn classify(&self, sql: &str) -> DetectionResult {
        if sql.trim().is_empty() {
            return DetectionResult::empty();
        }

        let tokens = match self.dialect.tokenize(sql) {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::debug!(dialect = %self.dialect, error = %err, "SQL could not be tokenized");
                return DetectionResult::unknown();
            }
        };

        let mut statements = Vec::new();
        let mut saw_comment = false;

        for segment in tokens.split(|t| matches!(t, Token::SemiColon)) {
            let mut significant = Vec::with_capacity(segment.len());
            for token in segment {
                match token {
                    Token::Whitespace(ws) if self.is_executable_comment(ws) => {
                        tracing::debug!(dialect = %self.dialect, "Executable comment in SQL");
                        return DetectionResult::unknown();
                    }
                    Token::Whitespace(ws) => saw_comment |= is_comment(ws),
                    Token::EOF => {}
                    other => significant.push(other),
                }
            }
            if !significant.is_empty() {
                statements.push(classify_segment(&significant));
            }
        }

        if statements.is_empty() {
            // Only comments (or only separators) were supplied.
            return if saw_comment {
                DetectionResult::unknown()
            } else {
                DetectionResult::empty()
            };
        }

        DetectionResult::from_segments(statements)
    }
}

impl WriteDetector {
    /// `/*! ... */` (and MariaDB `/*M! ... */`) bodies run as code on MySQL.
    /// Their content is never inspected; they make the whole text a write.
    fn is_executable_comment(&self, ws: &Whitespace) -> bool {
        match ws {
            Whitespace::MultiLineComment(body) if self.dialect.executes_bang_comments() => {
                let body = body.trim_start_matches("/*");
                body.starts_with('!') || body.starts_with("M!")
            }
            _ => false,
        }
    }
}

/// Classify SQL text with the default dialect.
pub fn classify(sql: &str) -> DetectionResult {
    WriteDetector::new().classify(sql)
}

fn is_comment(ws: &Whitespace) -> bool {
    matches!(
        ws,
        Whitespace::SingleLineComment { .. } | Whitespace::MultiLineComment(_)
    )
}

/// Upper-cased value of an unquoted word token.
fn keyword(token: &Token) -> Option<String> {
    match token {
        Token::Word(word) if word.quote_style.is_none() => Some(word.value.to_ascii_uppercase()),
        _ => None,
    }
}

fn classify_segment(tokens: &[&Token]) -> SegmentClassification {
    let leading_keyword = tokens
        .iter()
        .find(|t| !matches!(t, Token::LParen))
        .and_then(|t| keyword(t));

    let resolved = resolve(tokens, 0, 0);

    SegmentClassification {
        statement_type: resolved.statement_type,
        leading_keyword,
        contains_write: resolved.is_write(),
        matched_keyword: resolved.matched_keyword,
    }
}

/// Result of resolving a statement starting at some token position.
struct Resolved {
    statement_type: StatementType,
    matched_keyword: Option<String>,
}

impl Resolved {
    fn read(statement_type: StatementType) -> Self {
        Self {
            statement_type,
            matched_keyword: None,
        }
    }

    fn write(statement_type: StatementType, keyword: impl Into<String>) -> Self {
        Self {
            statement_type,
            matched_keyword: Some(keyword.into()),
        }
    }

    fn unknown(keyword: Option<String>) -> Self {
        Self {
            statement_type: StatementType::Unknown,
            matched_keyword: keyword,
        }
    }

    fn is_write(&self) -> bool {
        self.matched_keyword.is_some() || self.statement_type.is_write()
    }
}

fn resolve(tokens: &[&Token], start: usize, nesting: usize) -> Resolved {
    if nesting > MAX_NESTING {
        return Resolved::unknown(None);
    }

    let mut pos = start;
    while matches!(tokens.get(pos), Some(Token::LParen)) {
        pos += 1;
    }

    let Some(token) = tokens.get(pos) else {
        // `(` with nothing after it.
        return Resolved::unknown(None);
    };
    let Some(verb) = keyword(token) else {
        return Resolved::unknown(Some(token.to_string()));
    };

    if let Some(ty) = StatementType::mutating(&verb) {
        return Resolved::write(ty, verb);
    }

    match verb.as_str() {
        "WITH" => resolve_with(tokens, pos + 1, nesting),
        "EXPLAIN" => resolve_explain(tokens, pos + 1, nesting),
        "SELECT" => {
            if has_top_level_into(tokens, pos + 1) {
                Resolved::write(StatementType::Select, "INTO")
            } else {
                Resolved::read(StatementType::Select)
            }
        }
        _ => match StatementType::read_only(&verb) {
            Some(ty) => Resolved::read(ty),
            None => Resolved::unknown(Some(verb)),
        },
    }
}

/// `SELECT ... INTO new_table` creates a table in several dialects.
///
/// Scanning stops when the parenthesis enclosing the `SELECT` closes.
fn has_top_level_into(tokens: &[&Token], start: usize) -> bool {
    let mut depth: i32 = 0;
    for token in &tokens[start.min(tokens.len())..] {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ if depth == 0 && keyword(token).as_deref() == Some("INTO") => return true,
            _ => {}
        }
    }
    false
}

fn is_statement_verb(word: &str) -> bool {
    word == "WITH"
        || StatementType::mutating(word).is_some()
        || StatementType::read_only(word).is_some()
}

/// Resolve `WITH [RECURSIVE] name [(cols)] AS [NOT] [MATERIALIZED] (body), ... tail`.
///
/// The segment is a write if the tail is, or if any CTE body leads with a
/// mutating verb.
fn resolve_with(tokens: &[&Token], start: usize, nesting: usize) -> Resolved {
    let mut depth = 0usize;
    let mut prev_top_level: Option<String> = None;
    let mut body_write: Option<Resolved> = None;

    let mut pos = start;
    while pos < tokens.len() {
        let token = tokens[pos];
        match token {
            Token::LParen => {
                if depth == 0 && prev_top_level.as_deref() == Some(")") {
                    // Parenthesized tail: `WITH a AS (...) (SELECT ...)`.
                    let tail = resolve(tokens, pos, nesting + 1);
                    return match body_write {
                        Some(body) if !tail.is_write() => body,
                        _ => tail,
                    };
                }
                let opens_body = depth == 0
                    && matches!(prev_top_level.as_deref(), Some("AS" | "MATERIALIZED"));
                if opens_body && body_write.is_none() {
                    let body = resolve(tokens, pos + 1, nesting + 1);
                    if body.is_write() {
                        body_write = Some(body);
                    }
                }
                depth += 1;
            }
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    prev_top_level = Some(")".to_string());
                }
            }
            _ if depth == 0 => {
                let word = keyword(token);
                if let Some(w) = word.as_deref() {
                    // A verb right after a closed body starts the tail.
                    let after_body = prev_top_level.as_deref() == Some(")");
                    if after_body && is_statement_verb(w) {
                        let tail = resolve(tokens, pos, nesting + 1);
                        return match body_write {
                            Some(body) if !tail.is_write() => body,
                            _ => tail,
                        };
                    }
                }
                prev_top_level = word.or_else(|| Some(token.to_string()));
            }
            _ => {}
        }
        pos += 1;
    }

    // No tail statement found.
    match body_write {
        Some(body) => body,
        None => Resolved::unknown(Some("WITH".to_string())),
    }
}

/// Resolve `EXPLAIN [options] statement` by the explained statement.
fn resolve_explain(tokens: &[&Token], start: usize, nesting: usize) -> Resolved {
    let mut depth = 0usize;
    for (offset, token) in tokens[start.min(tokens.len())..].iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if keyword(token).is_some_and(|w| is_statement_verb(&w)) {
                    let target = resolve(tokens, start + offset, nesting + 1);
                    return if target.is_write() {
                        target
                    } else {
                        Resolved::read(StatementType::Explain)
                    };
                }
            }
            _ => {}
        }
    }
    Resolved::unknown(Some("EXPLAIN".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detect(sql: &str) -> DetectionResult {
        WriteDetector::new().classify(sql)
    }

    #[test]
    fn test_simple_select_is_read() {
        let result = detect("SELECT * FROM users");
        assert!(!result.contains_write);
        assert_eq!(result.statement_type, StatementType::Select);
        assert_eq!(result.matched_keyword, None);
        assert_eq!(result.statements.len(), 1);
        assert_eq!(result.statements[0].leading_keyword.as_deref(), Some("SELECT"));
    }

    #[test]
    fn test_every_mutating_keyword_is_write() {
        for kw in WriteDetector::mutating_keywords() {
            let sql = format!("{} something", kw.to_lowercase());
            let result = detect(&sql);
            assert!(result.contains_write, "{sql} should be a write");
            assert_eq!(result.matched_keyword.as_deref(), Some(kw));
        }
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(detect("").statement_type, StatementType::Empty);
        assert!(!detect("   \n\t ").contains_write);
        assert!(!detect(";;").contains_write);
    }

    #[test]
    fn test_comment_only_is_write() {
        let result = detect("-- just a comment");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Unknown);

        assert!(detect("/* block */").contains_write);
    }

    #[test]
    fn test_leading_comments_are_stripped() {
        let result = detect("/* hello */ -- more\n  UPDATE t SET a = 1");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Update);
        assert_eq!(result.matched_keyword.as_deref(), Some("UPDATE"));
    }

    #[test]
    fn test_parenthesized_select() {
        let result = detect("((SELECT 1))");
        assert!(!result.contains_write);
        assert_eq!(result.statement_type, StatementType::Select);
    }

    #[test]
    fn test_parenthesized_write() {
        let result = detect("(DELETE FROM t)");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Delete);
        assert_eq!(result.matched_keyword.as_deref(), Some("DELETE"));

        let result = detect("((INSERT INTO t VALUES (1)))");
        assert_eq!(result.statement_type, StatementType::Insert);

        let result = detect("(WITH a AS (SELECT 1) DELETE FROM t)");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Delete);
    }

    #[test]
    fn test_mysql_executable_comment_is_write() {
        let mysql = WriteDetector::with_dialect(SqlDialect::MySql);

        let result = mysql.classify("SELECT 1 /*!; DROP TABLE x */");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Unknown);

        assert!(mysql.classify("/*!40101 SET NAMES utf8 */ SELECT 1").contains_write);
        assert!(mysql.classify("SELECT /*M! STRAIGHT_JOIN */ 1").contains_write);

        // Plain block comments stay inert.
        assert!(!mysql.classify("SELECT 1 /* note */").contains_write);
    }

    #[test]
    fn test_bang_comment_is_inert_on_snowflake() {
        let result = detect("SELECT 1 /*! not executed here */");
        assert!(!result.contains_write);
        assert_eq!(result.statement_type, StatementType::Select);
    }

    #[test]
    fn test_unknown_leading_token_is_write() {
        let result = detect("COPY INTO t FROM @stage");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Unknown);
        assert_eq!(result.matched_keyword.as_deref(), Some("COPY"));

        let result = detect("USE WAREHOUSE analytics");
        assert_eq!(result.matched_keyword.as_deref(), Some("USE"));
    }

    #[test]
    fn test_quoted_identifier_is_not_a_keyword() {
        let result = detect("\"SELECT\" 1");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Unknown);
    }

    #[test]
    fn test_unterminated_string_fails_closed() {
        let result = detect("SELECT 'abc");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Unknown);
    }

    #[test]
    fn test_semicolon_inside_string_does_not_split() {
        let result = detect("SELECT 'a; DROP TABLE x' AS s");
        assert!(!result.contains_write);
        assert_eq!(result.statements.len(), 1);
    }

    #[test]
    fn test_trailing_comment_after_statement_is_ignored() {
        let result = detect("SELECT 1;\n-- done");
        assert!(!result.contains_write);
        assert_eq!(result.statements.len(), 1);
    }

    #[test]
    fn test_multi_statement_reports_first_write() {
        let result = detect("SELECT 1; SHOW TABLES; delete from t; drop table u");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Delete);
        assert_eq!(result.matched_keyword.as_deref(), Some("DELETE"));
        assert_eq!(result.statements.len(), 4);
        assert!(!result.statements[1].contains_write);
    }

    #[test]
    fn test_cte_tail_decides() {
        let read = detect("WITH a AS (SELECT 1) SELECT * FROM a");
        assert!(!read.contains_write);
        assert_eq!(read.statement_type, StatementType::Select);
        assert_eq!(read.statements[0].leading_keyword.as_deref(), Some("WITH"));

        let write = detect("WITH a AS (SELECT 1) INSERT INTO t SELECT * FROM a");
        assert!(write.contains_write);
        assert_eq!(write.statement_type, StatementType::Insert);
    }

    #[test]
    fn test_cte_with_column_list_and_multiple_bodies() {
        let sql = "WITH RECURSIVE a (x, y) AS (SELECT 1, 2), b AS MATERIALIZED (SELECT * FROM a) \
                   SELECT * FROM b";
        assert!(!detect(sql).contains_write);

        let sql = "with a (x) as (select 1), b as (select 2) update t set x = 1";
        let result = detect(sql);
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Update);
    }

    #[test]
    fn test_data_modifying_cte_body_is_write() {
        let result = detect("WITH d AS (DELETE FROM t RETURNING *) SELECT * FROM d");
        assert!(result.contains_write);
        assert_eq!(result.statement_type, StatementType::Delete);
        assert_eq!(result.matched_keyword.as_deref(), Some("DELETE"));
    }

    #[test]
    fn test_cte_without_tail_is_write() {
        let result = detect("WITH a AS (SELECT 1)");
        assert!(result.contains_write);
        assert_eq!(result.matched_keyword.as_deref(), Some("WITH"));
    }

    #[test]
    fn test_select_into_is_write() {
        let result = detect("SELECT * INTO backup FROM users");
        assert!(result.contains_write);
        assert_eq!(result.matched_keyword.as_deref(), Some("INTO"));

        // Identifiers that merely contain INTO are not the keyword.
        assert!(!detect("SELECT (SELECT 1) AS into_col FROM t").contains_write);
        assert!(!detect("WITH a AS (SELECT 1) (SELECT * FROM a)").contains_write);
    }

    #[test]
    fn test_explain_resolves_target() {
        let read = detect("EXPLAIN SELECT * FROM t");
        assert!(!read.contains_write);
        assert_eq!(read.statement_type, StatementType::Explain);

        let write = detect("EXPLAIN (ANALYZE, VERBOSE) DELETE FROM t");
        assert!(write.contains_write);
        assert_eq!(write.statement_type, StatementType::Delete);

        assert!(detect("EXPLAIN").contains_write);
    }

    #[test]
    fn test_show_and_describe_are_read() {
        assert_eq!(detect("show tables").statement_type, StatementType::Show);
        assert_eq!(detect("DESC TABLE t").statement_type, StatementType::Describe);
        assert_eq!(detect("describe table t").statement_type, StatementType::Describe);
        assert_eq!(detect("VALUES (1), (2)").statement_type, StatementType::Values);
    }

    #[test]
    fn test_deep_nesting_fails_closed() {
        let mut sql = String::new();
        for _ in 0..(MAX_NESTING + 2) {
            sql.push_str("WITH a AS (");
        }
        sql.push_str("SELECT 1");
        assert!(detect(&sql).contains_write);
    }

    #[test]
    fn test_statement_type_display() {
        assert_eq!(StatementType::Truncate.to_string(), "TRUNCATE");
        assert!(StatementType::Unknown.is_write());
        assert!(!StatementType::Empty.is_write());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let value = serde_json::to_value(detect("DROP TABLE x")).unwrap();
        assert_eq!(value["containsWrite"], true);
        assert_eq!(value["matchedKeyword"], "DROP");
        assert_eq!(value["statementType"], "drop");
    }
}
