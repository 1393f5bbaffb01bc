//! Read access to pool objects.

use crate::error::ObjectError;
use crate::id::ObjectId;
use crate::object::{EntryRecord, Object, ObjectKind};

/// Read-only access to the objects of a pool.
///
/// Implemented both by a committed pool and by an in-flight transaction,
/// so code that only reads (such as a name lookup) runs the same way
/// inside and outside a transaction. Only [`ObjectReader::object`] and
/// [`ObjectReader::root`] are required; the typed accessors are built on
/// top of them.
pub trait ObjectReader {
    /// The pool's root object id.
    fn root(&self) -> ObjectId;

    /// Read an object, or `None` if `id` is not live.
    fn object(&self, id: ObjectId) -> Option<&Object>;

    /// Read an object, failing with [`ObjectError::UnknownObject`].
    fn get(&self, id: ObjectId) -> Result<&Object, ObjectError> {
        self.object(id).ok_or(ObjectError::UnknownObject { id })
    }

    /// The registry list linked from the root, if one has been created.
    fn root_arrays(&self) -> Result<Option<ObjectId>, ObjectError> {
        let id = self.root();
        let obj = self.get(id)?;
        obj.as_root()
            .ok_or_else(|| mismatch(id, ObjectKind::Root, obj))
    }

    /// Read a `List` object.
    fn list(&self, id: ObjectId) -> Result<&[ObjectId], ObjectError> {
        let obj = self.get(id)?;
        obj.as_list().ok_or_else(|| mismatch(id, ObjectKind::List, obj))
    }

    /// Read an `Entry` object.
    fn entry(&self, id: ObjectId) -> Result<&EntryRecord, ObjectError> {
        let obj = self.get(id)?;
        obj.as_entry()
            .ok_or_else(|| mismatch(id, ObjectKind::Entry, obj))
    }

    /// Read a `Text` object.
    fn text(&self, id: ObjectId) -> Result<&str, ObjectError> {
        let obj = self.get(id)?;
        obj.as_text().ok_or_else(|| mismatch(id, ObjectKind::Text, obj))
    }

    /// Read an `Ints` object.
    fn ints(&self, id: ObjectId) -> Result<&[i32], ObjectError> {
        let obj = self.get(id)?;
        obj.as_ints().ok_or_else(|| mismatch(id, ObjectKind::Ints, obj))
    }
}

/// Build a [`ObjectError::KindMismatch`] for `obj`.
pub fn mismatch(id: ObjectId, expected: ObjectKind, obj: &Object) -> ObjectError {
    ObjectError::KindMismatch {
        id,
        expected,
        found: obj.kind(),
    }
}
