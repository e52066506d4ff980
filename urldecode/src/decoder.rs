//! Decoding a whole query into a struct.

use std::io::Read;

use urldecode_core::{Def, Field, PtrMut, Shape, Shaped};

use crate::value::decode_value;
use crate::{
    DecodeError, DecoderPool, FieldCache, FieldEntry, SCRATCH_LEN, Tokens, TypeError, unescape,
};

/// Decodes a query read from a stream.
///
/// Uses the process-wide [`FieldCache`] and [`DecoderPool`] unless given
/// others.
///
/// Decoding stops at the first value that fails, and returns its error.
/// Values decoded before that stay in the destination. Malformed escapes
/// are detected before anything is written.
#[derive(Debug)]
pub struct Decoder<'a, R> {
    source: R,
    cache: &'a FieldCache,
    pool: &'a DecoderPool,
}

impl<R: Read> Decoder<'static, R> {
    /// Creates a decoder reading the query from `source`.
    pub fn new(source: R) -> Self {
        Self {
            source,
            cache: FieldCache::global(),
            pool: DecoderPool::global(),
        }
    }
}

impl<'a, R: Read> Decoder<'a, R> {
    /// Resolves field tables through `cache` instead of the global one.
    pub fn with_cache<'b>(self, cache: &'b FieldCache) -> Decoder<'b, R>
    where
        'a: 'b,
    {
        Decoder {
            source: self.source,
            cache,
            pool: self.pool,
        }
    }

    /// Takes working buffers from `pool` instead of the global one.
    pub fn with_pool<'b>(self, pool: &'b DecoderPool) -> Decoder<'b, R>
    where
        'a: 'b,
    {
        Decoder {
            source: self.source,
            cache: self.cache,
            pool,
        }
    }

    /// Reads the rest of the source and decodes it into `dest`.
    pub fn decode<T: Shaped>(&mut self, dest: &mut T) -> Result<(), DecodeError> {
        let shape = T::SHAPE;
        ensure_struct(shape)?;

        let mut pooled = self.pool.get();
        let buffers = &mut *pooled;
        self.source.read_to_end(&mut buffers.read)?;
        run(
            &buffers.read,
            &mut buffers.query,
            &mut buffers.scratch,
            shape,
            PtrMut::new(dest),
            self.cache,
        )
    }

    /// Gives back the source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

/// Reads a query from `reader` and decodes it into `dest`.
pub fn decode_from<R: Read, T: Shaped>(reader: R, dest: &mut T) -> Result<(), DecodeError> {
    Decoder::new(reader).decode(dest)
}

/// Decodes a query held in memory into `dest`.
pub fn decode_bytes<T: Shaped>(bytes: &[u8], dest: &mut T) -> Result<(), DecodeError> {
    let shape = T::SHAPE;
    ensure_struct(shape)?;

    let mut pooled = DecoderPool::global().get();
    let buffers = &mut *pooled;
    run(
        bytes,
        &mut buffers.query,
        &mut buffers.scratch,
        shape,
        PtrMut::new(dest),
        FieldCache::global(),
    )
}

/// Decodes a query held in memory into `dest`.
pub fn decode_str<T: Shaped>(query: &str, dest: &mut T) -> Result<(), DecodeError> {
    decode_bytes(query.as_bytes(), dest)
}

/// Decodes a query into a fresh `T::default()`.
pub fn from_bytes<T: Shaped + Default>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut value = T::default();
    decode_bytes(bytes, &mut value)?;
    Ok(value)
}

/// Decodes a query into a fresh `T::default()`.
pub fn from_str<T: Shaped + Default>(query: &str) -> Result<T, DecodeError> {
    from_bytes(query.as_bytes())
}

fn ensure_struct(shape: &'static Shape) -> Result<(), TypeError> {
    match shape.def {
        Def::Struct(_) => Ok(()),
        _ => Err(TypeError::NotAStruct {
            type_name: shape.type_name(),
        }),
    }
}

fn run(
    raw: &[u8],
    query: &mut Vec<u8>,
    scratch: &mut [u8; SCRATCH_LEN],
    shape: &'static Shape,
    dest: PtrMut<'_>,
    cache: &FieldCache,
) -> Result<(), DecodeError> {
    unescape(raw, query, scratch)?;
    let table = cache.table_for(shape)?;

    for (key, value) in Tokens::new(query) {
        let Some(entry) = table.lookup(key) else {
            trace!(key = %key.escape_ascii(), "ignoring unknown key");
            continue;
        };
        trace!(key = entry.wire_name, depth = entry.depth(), "decoding value");

        // SAFETY: `dest` points to a `T` described by `shape`, whose table
        // this entry comes from.
        let result = unsafe { locate(dest, entry) }
            .map_err(DecodeError::from)
            .and_then(|slot| unsafe { decode_value(slot, entry.shape(), value, entry.wire_name) });
        if let Err(err) = result {
            debug!(key = entry.wire_name, error = %err, "aborting decode");
            return Err(err);
        }
    }
    Ok(())
}

/// Walks an entry's path from the root struct to the field it decodes into,
/// creating empty `Option`s and following `Box`es on the way.
///
/// # Safety
///
/// `root` must point to an initialized value of the struct the entry's
/// table was built for.
unsafe fn locate<'mem>(root: PtrMut<'mem>, entry: &FieldEntry) -> Result<PtrMut<'mem>, TypeError> {
    let mut ptr = root;
    let mut parent: Option<&'static Field> = None;
    for &field in &entry.path {
        if let Some(parent) = parent {
            ptr = unsafe { reach_struct(ptr, parent.shape(), entry.wire_name) }?;
        }
        ptr = unsafe { ptr.field(field.offset) };
        parent = Some(field);
    }
    Ok(ptr)
}

/// Goes through `Option` and `Box` layers of a flattened field.
unsafe fn reach_struct<'mem>(
    mut ptr: PtrMut<'mem>,
    mut shape: &'static Shape,
    key: &'static str,
) -> Result<PtrMut<'mem>, TypeError> {
    loop {
        match shape.def {
            Def::Struct(_) => return Ok(ptr),
            Def::Option(def) => {
                ptr = unsafe { (def.get_or_init)(ptr) }.ok_or(TypeError::Uninstantiable {
                    key,
                    type_name: def.t().type_name(),
                })?;
                shape = def.t();
            }
            Def::Pointer(def) => {
                ptr = unsafe { (def.borrow_mut)(ptr) };
                shape = def.pointee();
            }
            _ => {
                return Err(TypeError::UnsupportedKind {
                    key,
                    type_name: shape.type_name(),
                });
            }
        }
    }
}
