//! Binary encode/decode for pool images.
//!
//! All integers are little-endian. Strings are length-prefixed with a `u32`
//! length. An image is written whole on every commit:
//!
//! ```text
//! [MAGIC "PMAR"] [VERSION u8] [layout str] [capacity u64] [generation u64]
//! [root u32] [slot_count u32] [object_count u32]
//! [id u32, tag u8, payload] × object_count
//! [FNV-1a checksum u64 of everything above]
//! ```

use std::io::Write;

use pmarray_core::{EntryRecord, Object, ObjectId, ObjectKind, PoolGeneration};

use crate::checksum::image_checksum;
use crate::error::PoolError;
use crate::heap::Heap;
use crate::{FORMAT_VERSION, MAGIC};

/// Header fields stored alongside the heap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    /// Layout name the pool was created with.
    pub layout: String,
    /// Capacity in bytes fixed at creation.
    pub capacity: u64,
    /// Generation of the commit that wrote the image.
    pub generation: PoolGeneration,
    /// Root object id.
    pub root: ObjectId,
}

// ── Primitive writers ───────────────────────────────────────────

fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), PoolError> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), PoolError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), PoolError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), PoolError> {
    write_u32_le(w, s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────
//
// Readers work on a shrinking byte slice so lengths read from the image can
// be checked against the bytes actually left before anything is allocated.

fn take<'a>(r: &mut &'a [u8], n: usize, what: &str) -> Result<&'a [u8], PoolError> {
    if r.len() < n {
        return Err(PoolError::Malformed {
            detail: format!("truncated image while reading {what}"),
        });
    }
    let (head, tail) = r.split_at(n);
    *r = tail;
    Ok(head)
}

fn read_u8(r: &mut &[u8], what: &str) -> Result<u8, PoolError> {
    Ok(take(r, 1, what)?[0])
}

fn read_u32_le(r: &mut &[u8], what: &str) -> Result<u32, PoolError> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(take(r, 4, what)?);
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le(r: &mut &[u8], what: &str) -> Result<u64, PoolError> {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(take(r, 8, what)?);
    Ok(u64::from_le_bytes(buf))
}

fn read_i32_le(r: &mut &[u8], what: &str) -> Result<i32, PoolError> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(take(r, 4, what)?);
    Ok(i32::from_le_bytes(buf))
}

fn read_length_prefixed_str(r: &mut &[u8], what: &str) -> Result<String, PoolError> {
    let len = read_u32_le(r, what)? as usize;
    let bytes = take(r, len, what)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| PoolError::Malformed {
        detail: format!("invalid UTF-8 in {what}: {e}"),
    })
}

/// Read an element count and check that `count * elem_size` bytes remain.
fn read_count(r: &mut &[u8], elem_size: usize, what: &str) -> Result<usize, PoolError> {
    let count = read_u64_le(r, what)?;
    let fits = usize::try_from(count)
        .ok()
        .and_then(|c| c.checked_mul(elem_size))
        .is_some_and(|bytes| bytes <= r.len());
    if !fits {
        return Err(PoolError::Malformed {
            detail: format!("{what} length {count} exceeds image size"),
        });
    }
    Ok(count as usize)
}

// ── Object payloads ─────────────────────────────────────────────

fn encode_object(w: &mut dyn Write, obj: &Object) -> Result<(), PoolError> {
    write_u8(w, obj.kind().tag())?;
    match obj {
        Object::Root { arrays } => match arrays {
            Some(id) => {
                write_u8(w, 1)?;
                write_u32_le(w, id.0)?;
            }
            None => write_u8(w, 0)?,
        },
        Object::List(ids) => {
            write_u64_le(w, ids.len() as u64)?;
            for id in ids {
                write_u32_le(w, id.0)?;
            }
        }
        Object::Entry(rec) => {
            write_u32_le(w, rec.name.0)?;
            write_u64_le(w, rec.size)?;
            write_u32_le(w, rec.data.0)?;
        }
        Object::Text(s) => write_length_prefixed_str(w, s)?,
        Object::Ints(values) => {
            write_u64_le(w, values.len() as u64)?;
            for &v in values {
                w.write_all(&v.to_le_bytes())?;
            }
        }
    }
    Ok(())
}

fn decode_object(r: &mut &[u8]) -> Result<Object, PoolError> {
    let tag = read_u8(r, "object tag")?;
    let kind = ObjectKind::from_tag(tag).ok_or_else(|| PoolError::Malformed {
        detail: format!("unknown object tag {tag}"),
    })?;
    let obj = match kind {
        ObjectKind::Root => {
            let arrays = match read_u8(r, "root presence flag")? {
                0 => None,
                1 => Some(ObjectId(read_u32_le(r, "root arrays id")?)),
                other => {
                    return Err(PoolError::Malformed {
                        detail: format!("invalid root presence flag {other}"),
                    })
                }
            };
            Object::Root { arrays }
        }
        ObjectKind::List => {
            let count = read_count(r, 4, "list")?;
            let mut ids = Vec::with_capacity(count);
            for _ in 0..count {
                ids.push(ObjectId(read_u32_le(r, "list element")?));
            }
            Object::List(ids)
        }
        ObjectKind::Entry => Object::Entry(EntryRecord {
            name: ObjectId(read_u32_le(r, "entry name")?),
            size: read_u64_le(r, "entry size")?,
            data: ObjectId(read_u32_le(r, "entry data")?),
        }),
        ObjectKind::Text => Object::Text(read_length_prefixed_str(r, "text")?),
        ObjectKind::Ints => {
            let count = read_count(r, 4, "ints")?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(read_i32_le(r, "ints element")?);
            }
            Object::Ints(values)
        }
    };
    Ok(obj)
}

// ── Image encode/decode ─────────────────────────────────────────

/// Encode a full pool image, checksum trailer included.
pub fn encode_image(header: &ImageHeader, heap: &Heap) -> Result<Vec<u8>, PoolError> {
    let mut buf = Vec::with_capacity(64 + heap.used_bytes() as usize);
    let w: &mut dyn Write = &mut buf;

    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_length_prefixed_str(w, &header.layout)?;
    write_u64_le(w, header.capacity)?;
    write_u64_le(w, header.generation.0)?;
    write_u32_le(w, header.root.0)?;
    write_u32_le(w, heap.slot_count() as u32)?;
    write_u32_le(w, heap.live_count() as u32)?;
    for (id, obj) in heap.iter() {
        write_u32_le(w, id.0)?;
        encode_object(w, obj)?;
    }

    let checksum = image_checksum(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

/// Decode and validate a pool image.
///
/// Checks, in order: magic, checksum, version, then structure. The
/// checksum is verified before anything else is trusted, so a torn write
/// is reported as [`PoolError::ChecksumMismatch`].
pub fn decode_image(bytes: &[u8]) -> Result<(ImageHeader, Heap), PoolError> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Err(PoolError::InvalidMagic);
    }
    if bytes.len() < MAGIC.len() + 1 + 8 {
        return Err(PoolError::Malformed {
            detail: "image shorter than header and checksum".into(),
        });
    }
    let (body, trailer) = bytes.split_at(bytes.len() - 8);
    let mut stored = [0u8; 8];
    stored.copy_from_slice(trailer);
    let stored = u64::from_le_bytes(stored);
    let computed = image_checksum(body);
    if stored != computed {
        return Err(PoolError::ChecksumMismatch { stored, computed });
    }

    let mut r = &body[MAGIC.len()..];
    let version = read_u8(&mut r, "version")?;
    if version != FORMAT_VERSION {
        return Err(PoolError::UnsupportedVersion { found: version });
    }

    let header = ImageHeader {
        layout: read_length_prefixed_str(&mut r, "layout")?,
        capacity: read_u64_le(&mut r, "capacity")?,
        generation: PoolGeneration(read_u64_le(&mut r, "generation")?),
        root: ObjectId(read_u32_le(&mut r, "root id")?),
    };
    let slot_count = read_u32_le(&mut r, "slot count")?;
    let object_count = read_u32_le(&mut r, "object count")?;
    if object_count > slot_count {
        return Err(PoolError::Malformed {
            detail: format!("{object_count} objects in {slot_count} slots"),
        });
    }

    let mut heap = Heap::new();
    let mut last: Option<ObjectId> = None;
    for _ in 0..object_count {
        let id = ObjectId(read_u32_le(&mut r, "object id")?);
        if id.0 >= slot_count || last.is_some_and(|prev| id <= prev) {
            return Err(PoolError::Malformed {
                detail: format!("object id {id} out of order or out of range"),
            });
        }
        let obj = decode_object(&mut r)?;
        heap.install(id, obj);
        last = Some(id);
    }
    heap.extend_slots(slot_count as usize);

    if !r.is_empty() {
        return Err(PoolError::Malformed {
            detail: format!("{} trailing bytes after objects", r.len()),
        });
    }
    if !matches!(heap.get(header.root), Some(Object::Root { .. })) {
        return Err(PoolError::Malformed {
            detail: format!("root {} is missing or not a root object", header.root),
        });
    }
    if heap.used_bytes() > header.capacity {
        return Err(PoolError::Malformed {
            detail: format!(
                "live objects use {} bytes, capacity is {}",
                heap.used_bytes(),
                header.capacity
            ),
        });
    }

    Ok((header, heap))
}
