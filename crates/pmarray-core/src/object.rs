//! The durable object model stored in a pool heap.
//!
//! A pool holds a flat set of [`Object`]s addressed by [`ObjectId`]. Objects
//! reference each other only through ids, never through pointers, so the
//! whole heap can be encoded into a single image and decoded again without
//! fix-ups.

use std::fmt;

use crate::id::ObjectId;

/// Fixed per-object accounting overhead in bytes.
///
/// Every live object is charged this much on top of its payload when the
/// pool checks capacity.
pub const OBJECT_HEADER_BYTES: u64 = 16;

/// The record describing one named integer array.
///
/// `size` is always equal to the length of the `Ints` object referenced by
/// `data`. Both are updated together inside one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryRecord {
    /// `Text` object holding the entry name.
    pub name: ObjectId,
    /// Number of elements in the data buffer.
    pub size: u64,
    /// `Ints` object holding the elements.
    pub data: ObjectId,
}

/// A single durable object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    /// The pool root. `arrays` is `None` until the registry is initialised.
    Root {
        /// The `List` of entries, once created.
        arrays: Option<ObjectId>,
    },
    /// Ordered sequence of object ids.
    List(Vec<ObjectId>),
    /// Array entry record.
    Entry(EntryRecord),
    /// UTF-8 text.
    Text(String),
    /// Buffer of signed 32-bit integers.
    Ints(Vec<i32>),
}

impl Object {
    /// The kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Root { .. } => ObjectKind::Root,
            Self::List(_) => ObjectKind::List,
            Self::Entry(_) => ObjectKind::Entry,
            Self::Text(_) => ObjectKind::Text,
            Self::Ints(_) => ObjectKind::Ints,
        }
    }

    /// Bytes charged against pool capacity for this object.
    pub fn footprint(&self) -> u64 {
        let payload = match self {
            Self::Root { .. } => 8,
            Self::List(ids) => ids.len() as u64 * 4,
            Self::Entry(_) => 16,
            Self::Text(s) => s.len() as u64,
            Self::Ints(v) => v.len() as u64 * 4,
        };
        OBJECT_HEADER_BYTES + payload
    }

    /// Footprint an `Ints` buffer of `len` elements would have.
    ///
    /// Returns `None` on overflow, which callers treat as "does not fit".
    pub fn ints_footprint(len: u64) -> Option<u64> {
        len.checked_mul(4)?.checked_add(OBJECT_HEADER_BYTES)
    }

    /// The entry list id, if this is a root object.
    pub fn as_root(&self) -> Option<Option<ObjectId>> {
        match self {
            Self::Root { arrays } => Some(*arrays),
            _ => None,
        }
    }

    /// The id sequence, if this is a list.
    pub fn as_list(&self) -> Option<&[ObjectId]> {
        match self {
            Self::List(ids) => Some(ids),
            _ => None,
        }
    }

    /// The entry record, if this is an entry.
    pub fn as_entry(&self) -> Option<&EntryRecord> {
        match self {
            Self::Entry(rec) => Some(rec),
            _ => None,
        }
    }

    /// The text, if this is a text object.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer buffer, if this is an `Ints` object.
    pub fn as_ints(&self) -> Option<&[i32]> {
        match self {
            Self::Ints(v) => Some(v),
            _ => None,
        }
    }
}

/// Discriminant of an [`Object`], used in errors and in the image codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectKind {
    /// [`Object::Root`].
    Root = 1,
    /// [`Object::List`].
    List = 2,
    /// [`Object::Entry`].
    Entry = 3,
    /// [`Object::Text`].
    Text = 4,
    /// [`Object::Ints`].
    Ints = 5,
}

impl ObjectKind {
    /// Decode a kind from its wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Root),
            2 => Some(Self::List),
            3 => Some(Self::Entry),
            4 => Some(Self::Text),
            5 => Some(Self::Ints),
            _ => None,
        }
    }

    /// The wire tag for this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::List => "list",
            Self::Entry => "entry",
            Self::Text => "text",
            Self::Ints => "ints",
        };
        f.write_str(name)
    }
}
