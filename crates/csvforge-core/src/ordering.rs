use crate::error::{Error, Result};
use crate::schema::Column;

/// Gap-free column ordering shared by the header and every row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOrdering {
    columns: Vec<Column>,
}

impl ResolvedOrdering {
    /// Columns by position; `columns()[i].order == Some(i)`.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedOrdering {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Assign every column a unique position in `0..n`.
///
/// Columns with an explicit order are placed first; the remaining positions
/// are filled left to right with the unordered columns in their original
/// relative order. Expects a validated schema, but still rejects out-of-range
/// or duplicated explicit orders instead of overwriting.
pub fn resolve_order(columns: &[Column]) -> Result<ResolvedOrdering> {
    let count = columns.len();
    let mut slots: Vec<Option<Column>> = vec![None; count];
    let mut without_order = Vec::new();

    for column in columns {
        let Some(order) = column.order else {
            without_order.push(column.clone());
            continue;
        };
        let slot = usize::try_from(order)
            .ok()
            .and_then(|idx| slots.get_mut(idx))
            .ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "column {} order out of range ({order}); must be between 0 and {}",
                    column.label,
                    count as i64 - 1
                ))
            })?;
        if slot.is_some() {
            return Err(Error::InvalidSchema(format!(
                "column {} order duplicated ({order}); each order value must be unique",
                column.label
            )));
        }
        *slot = Some(column.clone());
    }

    let mut unordered = without_order.into_iter();
    let mut resolved = Vec::with_capacity(count);
    for (position, slot) in slots.into_iter().enumerate() {
        let mut column = match slot {
            Some(column) => column,
            // Explicit orders are unique and in range, so gaps == unordered columns.
            None => unordered.next().ok_or_else(|| {
                Error::InvalidSchema(format!("no column available for position {position}"))
            })?,
        };
        column.order = Some(position as i64);
        resolved.push(column);
    }

    Ok(ResolvedOrdering { columns: resolved })
}
