//! Search index document for a cleaned sale record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::table::Table;

/// A cleaned sale row rendered as a flat key/value document.
///
/// Keys are the clean table's column names, verbatim and in column order.
/// No document identifier is carried; the search engine assigns its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleDocument {
    fields: Map<String, Value>,
}

impl SaleDocument {
    /// Build a document from `(column, value)` pairs.
    pub fn from_record<'a, I>(record: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let fields = record
            .into_iter()
            .map(|(column, value)| (column.to_string(), typed_value(value)))
            .collect();
        Self { fields }
    }

    /// Build one document per row of `table`, preserving row order.
    pub fn from_table(table: &Table) -> Vec<Self> {
        table.records().map(Self::from_record).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Render a text field as the JSON value an indexer would infer for it.
///
/// Plain integers and plain decimals become numbers; absent values become
/// null; everything else stays a string, untouched.
fn typed_value(value: Option<&str>) -> Value {
    let Some(text) = value else {
        return Value::Null;
    };

    if is_integer_text(text) {
        if let Ok(n) = text.parse::<i64>() {
            return Value::Number(n.into());
        }
    }
    if is_decimal_text(text) {
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(text.to_string())
}

/// Optional sign followed by digits, without leading zeros.
fn is_integer_text(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
}

/// Optional sign, integer part, a dot, fractional part.
fn is_decimal_text(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let Some((int_part, frac_part)) = unsigned.split_once('.') else {
        return false;
    };
    !int_part.is_empty()
        && !frac_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}
