//! Flat-file persistence for the record store.
//!
//! One CSV file per run: header row is the store's column union, rows render
//! missing fields as empty cells. Checkpoints rewrite the whole file; the
//! write goes to a temp sibling that is renamed into place, so an interrupted
//! run never leaves a truncated store behind.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::mem::take;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::{RecordStore, ScrapeError, ScrapeResult, SchoolRecord};

const SEP: char = ',';

/// CSV-backed store at a fixed path.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store. First row is the header; every data row is
    /// zipped against it, extra cells dropped, short rows padded with empty.
    pub fn load(&self) -> ScrapeResult<RecordStore> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| ScrapeError::store(self.path.clone(), e))?;
        let mut rows = parse_rows(&text);
        if rows.is_empty() {
            return Ok(RecordStore::new());
        }
        let columns = rows.remove(0);

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = SchoolRecord::new();
            for (i, column) in columns.iter().enumerate() {
                record.set(column.clone(), row.get(i).cloned().unwrap_or_default());
            }
            records.push(record);
        }
        let store = RecordStore::from_parts(columns, records);
        debug!("Loaded {} records from {}", store.len(), self.path.display());
        Ok(store)
    }

    /// Rewrite the whole file from the in-memory store.
    pub fn save(&self, store: &RecordStore) -> ScrapeResult<()> {
        self.write_atomically(store)
            .map_err(|e| ScrapeError::store(self.path.clone(), e))?;
        info!("Saved {} records to {}", store.len(), self.path.display());
        Ok(())
    }

    fn write_atomically(&self, store: &RecordStore) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let file = fs::File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            write_row(&mut writer, store.columns())?;
            let mut cells = Vec::with_capacity(store.columns().len());
            for record in store.iter() {
                cells.clear();
                for column in store.columns() {
                    cells.push(record.get(column).unwrap_or_default().to_string());
                }
                write_row(&mut writer, &cells)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)
    }
}

/// Minimal CSV parser (quotes + CRLF tolerant).
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == SEP && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !row.is_empty() && !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush any trailing field/row even if quotes were unterminated.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row.
fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{SEP}")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}
