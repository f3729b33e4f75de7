//! Item catalog: loading, lookup and runtime registration.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{CSV_COLUMN_IMAGE, CSV_COLUMN_NAME, CSV_COLUMN_PRICE};
use crate::error::MissionError;

/// A single item available for purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Unit price in won
    pub unit_price: u32,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, unit_price: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            image_ref: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

/// Errors raised while loading a catalog source.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog source is empty")]
    Empty,
    #[error("missing column {0:?} in header")]
    MissingColumn(&'static str),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: missing required field {field:?}")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: invalid price {value:?}")]
    InvalidPrice { line: usize, value: String },
    #[error("line {line}: duplicate item {name:?}")]
    Duplicate { line: usize, name: String },
}

/// Ordered item catalog. Display order follows load order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Create an empty catalog (useful for tests)
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a catalog from pre-parsed entries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] if two entries share a name.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut catalog = Self::empty();
        for (idx, entry) in entries.into_iter().enumerate() {
            if catalog.find(&entry.name).is_some() {
                return Err(CatalogError::Duplicate {
                    line: idx + 1,
                    name: entry.name,
                });
            }
            catalog.entries.push(entry);
        }
        Ok(catalog)
    }

    /// Parse a catalog from CSV text with a `name,price[,image_url]` header.
    /// Quoted fields may contain commas, `""` escapes and line breaks.
    ///
    /// # Errors
    ///
    /// Errors report the line a record starts on.
    /// Returns an error if the header lacks a required column, a row is
    /// malformed, a price is not a non-negative integer, or a name repeats.
    pub fn from_csv_str(text: &str) -> Result<Self, CatalogError> {
        let mut rows = csv_records(text)?.into_iter();

        let (_, header) = rows.next().ok_or(CatalogError::Empty)?;
        let column = |name: &str| header.iter().position(|h| h.trim() == name);
        let name_col = column(CSV_COLUMN_NAME).ok_or(CatalogError::MissingColumn(CSV_COLUMN_NAME))?;
        let price_col =
            column(CSV_COLUMN_PRICE).ok_or(CatalogError::MissingColumn(CSV_COLUMN_PRICE))?;
        let image_col = column(CSV_COLUMN_IMAGE);

        let mut catalog = Self::empty();
        for (line, fields) in rows {
            let field = |col: usize| fields.get(col).map(|f| f.trim()).filter(|f| !f.is_empty());

            let name = field(name_col).ok_or(CatalogError::MissingField {
                line,
                field: CSV_COLUMN_NAME,
            })?;
            let price_raw = field(price_col).ok_or(CatalogError::MissingField {
                line,
                field: CSV_COLUMN_PRICE,
            })?;
            let unit_price = price_raw
                .parse::<u32>()
                .map_err(|_| CatalogError::InvalidPrice {
                    line,
                    value: price_raw.to_string(),
                })?;
            if catalog.find(name).is_some() {
                return Err(CatalogError::Duplicate {
                    line,
                    name: name.to_string(),
                });
            }

            catalog.entries.push(CatalogEntry {
                name: name.to_string(),
                unit_price,
                image_ref: image_col.and_then(field).map(str::to_string),
            });
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Look up an item by name.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::UnknownItem`] if the item is not listed.
    pub fn lookup(&self, name: &str) -> Result<&CatalogEntry, MissionError> {
        self.find(name)
            .ok_or_else(|| MissionError::UnknownItem(name.to_string()))
    }

    /// Insert an item at runtime.
    ///
    /// An existing item with the same name is overwritten in place, keeping
    /// its display position.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::InvalidCatalogEntry`] for an empty name or a
    /// zero price.
    pub fn register(&mut self, name: &str, unit_price: u32) -> Result<(), MissionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MissionError::InvalidCatalogEntry {
                name: name.to_string(),
                reason: "name must not be empty",
            });
        }
        if unit_price == 0 {
            return Err(MissionError::InvalidCatalogEntry {
                name: name.to_string(),
                reason: "price must be positive",
            });
        }

        if let Some(existing) = self.entries.iter_mut().find(|entry| entry.name == name) {
            log::warn!(
                "catalog entry {name:?} overwritten: {} -> {unit_price}",
                existing.unit_price
            );
            existing.unit_price = unit_price;
        } else {
            log::debug!("catalog entry {name:?} registered at {unit_price}");
            self.entries.push(CatalogEntry::new(name, unit_price));
        }
        Ok(())
    }

    /// Resolve a 1-based display index to an entry.
    #[must_use]
    pub fn by_position(&self, position: usize) -> Option<&CatalogEntry> {
        position.checked_sub(1).and_then(|idx| self.entries.get(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split CSV text into records, each tagged with the line it starts on.
/// Blank lines are skipped; `\r\n` is read as `\n`.
fn csv_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, CatalogError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
                quoted = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' if in_quotes => {
                line += 1;
                current.push('\n');
            }
            '\n' => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, record_line, std::mem::take(&mut fields), quoted);
                quoted = false;
                line += 1;
                record_line = line;
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(CatalogError::Parse {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    fields.push(current);
    push_record(&mut records, record_line, fields, quoted);
    Ok(records)
}

fn push_record(
    records: &mut Vec<(usize, Vec<String>)>,
    line: usize,
    fields: Vec<String>,
    quoted: bool,
) {
    let blank = !quoted && fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push((line, fields));
    }
}

/// Trait for abstracting where a catalog comes from.
pub trait CatalogSource {
    /// Load the catalog from the backing source
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing or malformed.
    fn load_catalog(&self) -> Result<Catalog, CatalogError>;
}

/// The literal stationery table the mission ships with.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl CatalogSource for BuiltinCatalog {
    fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::from_entries(vec![
            CatalogEntry::new("연필", 1_000),
            CatalogEntry::new("공책", 3_000),
            CatalogEntry::new("지우개", 1_500),
            CatalogEntry::new("필통", 5_000),
            CatalogEntry::new("가방", 20_000),
        ])
    }
}

/// Catalog backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CsvCatalog {
    fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let text = fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        let catalog = Catalog::from_csv_str(&text)?;
        log::info!(
            "loaded {} catalog entries from {}",
            catalog.len(),
            self.path.display()
        );
        Ok(catalog)
    }
}

/// Loads a catalog once and keeps it until explicitly invalidated.
#[derive(Debug)]
pub struct CatalogCache<S: CatalogSource> {
    source: S,
    cached: Option<Catalog>,
}

impl<S: CatalogSource> CatalogCache<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            cached: None,
        }
    }

    /// Return the cached catalog, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the first load fails. A failed load is not cached.
    pub fn get(&mut self) -> Result<&Catalog, CatalogError> {
        if self.cached.is_none() {
            self.cached = Some(self.source.load_catalog()?);
        }
        Ok(self.cached.get_or_insert_with(Catalog::empty))
    }

    /// Drop the cached catalog so the next [`Self::get`] reloads it.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }
}
