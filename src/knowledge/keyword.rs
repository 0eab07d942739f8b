//! BM25 keyword ranking over the manual, backed by an in-memory SQLite FTS5 table.

use parking_lot::Mutex;
use rusqlite::Connection;

/// Lowercase and split on anything that is not alphanumeric.
///
/// This matches FTS5's `unicode61` tokenizer, so query terms line up with
/// the indexed ones.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Turn free text into an FTS5 `MATCH` expression: every token quoted and
/// OR-ed, so operators like `NOT` in user text stay plain words.
pub fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = tokenize(query)
        .into_iter()
        .map(|t| format!("\"{t}\""))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Documents are stored with `rowid = position + 1`, so hits map straight
/// back to corpus indices.
#[derive(Debug)]
pub struct KeywordIndex {
    conn: Mutex<Connection>,
    len: usize,
}

impl KeywordIndex {
    pub fn build<S: AsRef<str>>(documents: &[S]) -> rusqlite::Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(
            r#"
            CREATE VIRTUAL TABLE manual_fts USING fts5(
                body,
                tokenize='unicode61'
            );
            "#,
        )?;

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO manual_fts(rowid, body) VALUES (?, ?)")?;
            for (i, doc) in documents.iter().enumerate() {
                let rowid = i64::try_from(i + 1).unwrap_or(i64::MAX);
                stmt.execute(rusqlite::params![rowid, doc.as_ref()])?;
            }
        }
        tx.commit()?;

        Ok(Self {
            conn: Mutex::new(conn),
            len: documents.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `k` best documents sharing at least one term with `query`, best
    /// first, as `(index, score)` with higher scores better.
    pub fn top_k(&self, query: &str, k: usize) -> rusqlite::Result<Vec<(usize, f64)>> {
        let Some(expr) = match_expression(query) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(k).unwrap_or(i64::MAX);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT rowid, bm25(manual_fts) AS rank
            FROM manual_fts
            WHERE manual_fts MATCH ?
            ORDER BY rank, rowid
            LIMIT ?
            "#,
        )?;
        let rows = stmt.query_map(rusqlite::params![expr, limit], |row| {
            let rowid: i64 = row.get(0)?;
            let rank: f64 = row.get(1)?;
            Ok((rowid, rank))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (rowid, rank) = row?;
            if let Some(index) = usize::try_from(rowid).ok().and_then(|r| r.checked_sub(1)) {
                // FTS5 ranks lower-is-better; flip so callers see higher-is-better.
                hits.push((index, -rank));
            }
        }
        Ok(hits)
    }
}
