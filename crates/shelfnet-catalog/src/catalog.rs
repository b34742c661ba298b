//! The set of books in one batch, with O(1) lookup by title.

use std::collections::HashMap;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::item::{BookRecord, Item};
use shelfnet_core::{Error, Result};

/// Books of one batch in input order, indexed by title.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Build a catalog, rejecting repeated titles.
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.title().to_string(), position).is_some() {
                return Err(Error::DuplicateIdentifier(item.title().to_string()));
            }
        }
        Ok(Self { items, index })
    }

    /// Parse `{"books": [...]}` or a bare array of books.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::MalformedInput(format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Parse books JSON from any reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::from_json_str(&raw)
    }

    /// Load a books file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            Error::MalformedInput(msg) => {
                Error::MalformedInput(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        info!("Loaded {} books from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    fn from_value(value: Value) -> Result<Self> {
        let books = match value {
            Value::Array(books) => books,
            Value::Object(mut map) => match map.remove("books") {
                Some(Value::Array(books)) => books,
                Some(_) => {
                    return Err(Error::MalformedInput("'books' must be an array".into()));
                }
                None => return Err(Error::MalformedInput("missing 'books' array".into())),
            },
            _ => {
                return Err(Error::MalformedInput(
                    "expected an object with 'books' or an array of books".into(),
                ));
            }
        };

        let mut items = Vec::with_capacity(books.len());
        for (position, book) in books.into_iter().enumerate() {
            let record: BookRecord = serde_json::from_value(book)
                .map_err(|e| Error::MalformedInput(format!("book #{}: {}", position, e)))?;
            items.push(Item::from(record));
        }
        debug!("Parsed {} book records", items.len());
        Self::from_items(items)
    }

    pub fn lookup(&self, title: &str) -> Result<&Item> {
        self.index
            .get(title)
            .map(|&position| &self.items[position])
            .ok_or_else(|| Error::NotFound(format!("book '{}'", title)))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.index.contains_key(title)
    }

    /// Books in catalog (input) order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Item::title)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a ItemCatalog {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
