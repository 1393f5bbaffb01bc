//! Read-only views of registry entries.

use std::fmt;

use pmarray_core::{ObjectId, ObjectReader};

use crate::error::RegistryError;

/// A borrowed view of one named array.
///
/// Construction checks that the entry record's size matches the length of
/// its data buffer, so a view never exposes an inconsistent entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
    id: ObjectId,
    name: &'a str,
    values: &'a [i32],
}

impl<'a> Entry<'a> {
    /// Resolve the entry record `id` through `reader`.
    pub fn read<R: ObjectReader + ?Sized>(reader: &'a R, id: ObjectId) -> Result<Self, RegistryError> {
        let record = reader.entry(id)?;
        let name = reader.text(record.name)?;
        let values = reader.ints(record.data)?;
        if record.size != values.len() as u64 {
            return Err(RegistryError::Inconsistent {
                name: name.to_string(),
                size: record.size,
                len: values.len(),
            });
        }
        Ok(Self { id, name, values })
    }

    /// Object id of the entry record.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Entry name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Number of elements.
    pub fn size(&self) -> u64 {
        self.values.len() as u64
    }

    /// Current values in index order.
    pub fn values(&self) -> &'a [i32] {
        self.values
    }
}

/// Renders as `name = [v0, v1, ...]`.
impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = [", self.name)?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}
