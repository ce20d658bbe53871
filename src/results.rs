use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row from either backend: column names shared across the result set,
/// values positionally aligned with them.
#[derive(Debug, Clone)]
pub struct FacadeRow {
    columns: Arc<Vec<String>>,
    values: Vec<RowValues>,
    // Cached name-to-index map, shared across rows of one result set.
    index: Arc<HashMap<String, usize>>,
}

impl FacadeRow {
    #[must_use]
    pub fn new(columns: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let index = Arc::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        Self {
            columns,
            values,
            index,
        }
    }

    pub(crate) fn with_index(
        columns: Arc<Vec<String>>,
        values: Vec<RowValues>,
        index: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            columns,
            values,
            index,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value by column name, `None` if the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RowValues> {
        self.index.get(column).and_then(|&i| self.values.get(i))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }
}

/// Uniform result wrapper, identical in shape for both backends.
///
/// `data` is the ordered sequence of returned rows: fetched rows for a
/// select, the affected rows for insert/update (via `RETURNING *`), and
/// always empty for delete or for mutations matching nothing. Failures are
/// raised as errors, never encoded in the envelope.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub data: Vec<FacadeRow>,
}

impl Envelope {
    #[must_use]
    pub fn new(data: Vec<FacadeRow>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lookup_by_name_and_index() {
        let columns = Arc::new(vec!["id".to_string(), "title".to_string()]);
        let row = FacadeRow::new(
            columns,
            vec![RowValues::Int(1), RowValues::Text("Two Sum".into())],
        );
        assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
        assert_eq!(row.get_by_index(1), Some(&RowValues::Text("Two Sum".into())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn empty_envelope_is_not_an_error() {
        let envelope = Envelope::default();
        assert!(envelope.is_empty());
        assert_eq!(envelope.len(), 0);
    }
}
