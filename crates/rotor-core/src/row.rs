use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// One dataset record: an ordered mapping from column name to the raw cell
/// text. Column names are shared by every row of a dataset.
///
/// Cells are kept verbatim; typing happens at comparison time (see
/// [`crate::value::Value`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Arc<[String]>,
}

impl Row {
    /// Build a row over shared column names. `values` must have one entry
    /// per column; the dataset loader guarantees this.
    pub fn new(columns: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            columns,
            values: values.into(),
        }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values: values.into(),
        }
    }

    /// Raw cell for `field`, or `None` if the column does not exist.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == field)
            .map(|i| self.values[i].as_str())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to cell strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut pairs: Vec<(String, String)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((column, value)) = access.next_entry::<String, String>()? {
                    pairs.push((column, value));
                }
                Ok(Row::from_pairs(pairs))
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_pairs([("Date", "2024-01-02"), ("Close", "21,665.80"), ("Open", "21,727.75")])
    }

    #[test]
    fn get_by_column_name() {
        let row = sample();
        assert_eq!(row.get("Close"), Some("21,665.80"));
        assert_eq!(row.get("Volume"), None);
    }

    #[test]
    fn serializes_in_column_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"Date":"2024-01-02","Close":"21,665.80","Open":"21,727.75"}"#
        );
    }

    #[test]
    fn deserialize_keeps_document_order() {
        let row: Row = serde_json::from_str(r#"{"Zeta":"1","Alpha":"2"}"#).unwrap();
        assert_eq!(row.columns(), &["Zeta".to_string(), "Alpha".to_string()]);
        assert_eq!(row.get("Alpha"), Some("2"));
    }
}
