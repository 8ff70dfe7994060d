//! The splice engine.
//!
//! Every mutation follows the same discipline on a flat byte buffer:
//! locate the target, splice the replacement bytes in, rewrite the length
//! field of every enclosing atom, then shift every chunk offset table entry
//! that points past the original end of `moov` by the length difference.

use std::io::{Cursor, Seek, SeekFrom};

use log::debug;

use crate::atom::ident::*;
use crate::atom::template;
use crate::atom::{self, AtomBounds, Data, Head, MetaItem};
use crate::extract::trak_list;
use crate::util::{be_u32_at, set_be_u32_at, set_be_u64_at};
use crate::ErrorKind;

/// A single contiguous byte range replacement.
struct Splice {
    pos: u64,
    end: u64,
    bytes: Vec<u8>,
}

impl Splice {
    fn insert(pos: u64, bytes: Vec<u8>) -> Self {
        Self { pos, end: pos, bytes }
    }

    fn replace(bounds: &AtomBounds, bytes: Vec<u8>) -> Self {
        Self { pos: bounds.pos(), end: bounds.end(), bytes }
    }

    fn remove(bounds: &AtomBounds) -> Self {
        Self { pos: bounds.pos(), end: bounds.end(), bytes: Vec::new() }
    }

    fn len_diff(&self) -> i64 {
        self.bytes.len() as i64 - (self.end - self.pos) as i64
    }
}

/// Applies the splice and restores every container invariant.
///
/// `ancestors` are the bounds of the atoms enclosing the spliced range, from
/// `moov` down; their length fields are adjusted by the length difference.
/// Chunk offset entries at or past the original end of `moov` are shifted by
/// the same amount, which keeps media locatable for both `mdat`-before-`moov`
/// and `moov`-before-`mdat` layouts.
fn apply(bytes: &[u8], ancestors: &[AtomBounds], splice: Splice) -> crate::Result<Vec<u8>> {
    let delta = splice.len_diff();

    let mut out = Vec::with_capacity((bytes.len() as i64 + delta) as usize);
    out.extend_from_slice(&bytes[..splice.pos as usize]);
    out.extend_from_slice(&splice.bytes);
    out.extend_from_slice(&bytes[splice.end as usize..]);

    if delta == 0 {
        return Ok(out);
    }

    debug!(
        "spliced {} bytes over [{}, {}), delta {}",
        splice.bytes.len(),
        splice.pos,
        splice.end,
        delta,
    );

    for a in ancestors {
        update_len(&mut out, a, delta)?;
    }

    if let Some(moov) = ancestors.first() {
        shift_chunk_offsets(&mut out, moov.end(), delta)?;
    }

    Ok(out)
}

/// Rewrites the length field of an enclosing atom whose position is unchanged
/// by the splice.
fn update_len(out: &mut [u8], bounds: &AtomBounds, delta: i64) -> crate::Result<()> {
    let new_len = bounds.len() as i64 + delta;
    if bounds.ext() {
        set_be_u64_at(out, bounds.pos() as usize + 8, new_len as u64);
    } else {
        if new_len > u32::MAX as i64 {
            return Err(crate::Error::new(
                ErrorKind::InvalidContainer,
                format!("Atom {} grows past the 32 bit length limit", bounds.fourcc()),
            ));
        }
        set_be_u32_at(out, bounds.pos() as usize, new_len as u32);
    }
    Ok(())
}

/// Walks the new `moov` and shifts every `stco`/`co64` entry at or past
/// `threshold` by `delta`.
fn shift_chunk_offsets(out: &mut Vec<u8>, threshold: u64, delta: i64) -> crate::Result<()> {
    let moov = atom::find_top_level(out, MOVIE)?.ok_or_else(|| {
        crate::Error::new(
            ErrorKind::AtomNotFound(MOVIE),
            "Missing necessary data, no movie (moov) atom found",
        )
    })?;

    let mut tables = Vec::new();
    let mut stack = vec![moov];
    while let Some(bounds) = stack.pop() {
        let (start, end) = atom::content_window(&bounds)?;
        for child in atom::scan_atoms(out, start, end)? {
            match child.fourcc() {
                TRACK | MEDIA | MEDIA_INFORMATION | SAMPLE_TABLE => stack.push(child),
                SAMPLE_TABLE_CHUNK_OFFSET | SAMPLE_TABLE_CHUNK_OFFSET_64 => tables.push(child),
                _ => (),
            }
        }
    }

    for table in tables {
        shift_table(out, &table, threshold, delta)?;
    }

    Ok(())
}

fn shift_table(
    out: &mut [u8],
    bounds: &AtomBounds,
    threshold: u64,
    delta: i64,
) -> crate::Result<()> {
    let wide = bounds.fourcc() == SAMPLE_TABLE_CHUNK_OFFSET_64;
    let width = if wide { 8 } else { 4 };
    let content = bounds.content_pos() as usize;

    let entries = be_u32_at(out, content + 4).ok_or_else(|| {
        crate::Error::new(ErrorKind::Truncated, "Chunk offset table head is out of bounds")
    })? as u64;
    if 8 + entries * width != bounds.content_len() {
        return Err(crate::Error::new(
            ErrorKind::InvalidContainer,
            format!("Chunk offset ({}) table size doesn't match atom length", bounds.fourcc()),
        ));
    }

    let mut shifted = 0;
    for i in 0..entries as usize {
        let pos = content + 8 + i * width as usize;
        if wide {
            let mut buf = [0; 8];
            buf.copy_from_slice(&out[pos..pos + 8]);
            let offset = u64::from_be_bytes(buf);
            if offset >= threshold {
                let new = offset as i128 + delta as i128;
                if new < 0 || new > u64::MAX as i128 {
                    return Err(crate::Error::new(
                        ErrorKind::OffsetOverflow,
                        format!("Shifting chunk offset {offset} by {delta} overflows"),
                    ));
                }
                set_be_u64_at(out, pos, new as u64);
                shifted += 1;
            }
        } else {
            let offset = be_u32_at(out, pos).unwrap_or(0);
            if offset as u64 >= threshold {
                let new = offset as i64 + delta;
                if new < 0 || new > u32::MAX as i64 {
                    return Err(crate::Error::new(
                        ErrorKind::OffsetOverflow,
                        format!("Shifting 32 bit chunk offset {offset} by {delta} overflows"),
                    ));
                }
                set_be_u32_at(out, pos, new as u32);
                shifted += 1;
            }
        }
    }

    debug!("shifted {shifted} of {entries} entries in {} by {delta}", bounds.fourcc());

    Ok(())
}

/// The bounds of the metadata atom hierarchy, as far as it exists.
struct MetaChain {
    moov: AtomBounds,
    udta: Option<AtomBounds>,
    meta: Option<AtomBounds>,
    hdlr: Option<AtomBounds>,
    ilst: Option<AtomBounds>,
}

fn find_meta_chain(bytes: &[u8]) -> crate::Result<MetaChain> {
    let moov = atom::find_top_level(bytes, MOVIE)?.ok_or_else(|| {
        crate::Error::new(
            ErrorKind::AtomNotFound(MOVIE),
            "Missing necessary data, no movie (moov) atom found",
        )
    })?;

    let udta = atom::find_child(bytes, &moov, USER_DATA)?;
    let meta = match &udta {
        Some(udta) => atom::find_child(bytes, udta, METADATA)?,
        None => None,
    };
    let (hdlr, ilst) = match &meta {
        Some(meta) => (
            atom::find_child(bytes, meta, HANDLER_REFERENCE)?,
            atom::find_child(bytes, meta, ITEM_LIST)?,
        ),
        None => (None, None),
    };

    Ok(MetaChain { moov, udta, meta, hdlr, ilst })
}

/// Reads the `(mean, name)` pair of a freeform (`----`) atom.
fn freeform_ident(bytes: &[u8], bounds: &AtomBounds) -> crate::Result<Option<(String, String)>> {
    let (start, end) = atom::content_window(bounds)?;
    let mut mean = None;
    let mut name = None;

    for sub in atom::scan_atoms(bytes, start, end)? {
        let target = match sub.fourcc() {
            MEAN => &mut mean,
            NAME => &mut name,
            _ => continue,
        };
        if sub.content_len() < 4 {
            return Err(crate::Error::new(
                ErrorKind::Truncated,
                format!("Atom {} is too short to hold its version and flags", sub.fourcc()),
            ));
        }
        let payload = &bytes[(sub.content_pos() + 4) as usize..sub.end() as usize];
        *target = Some(String::from_utf8(payload.to_vec())?);
    }

    Ok(mean.zip(name))
}

/// Returns the bounds of the `ilst` child matching the identifier.
///
/// Standard items match by fourcc alone, freeform items by their
/// `(mean, name)` pair.
fn find_item_child(
    bytes: &[u8],
    ilst: &AtomBounds,
    ident: &DataIdent,
) -> crate::Result<Option<AtomBounds>> {
    let (start, end) = atom::content_window(ilst)?;

    for child in atom::scan_atoms(bytes, start, end)? {
        match ident {
            DataIdent::Fourcc(fourcc) => {
                if child.fourcc() == *fourcc {
                    return Ok(Some(child));
                }
            }
            DataIdent::Freeform { mean, name } => {
                if child.fourcc() == FREEFORM {
                    if let Some((m, n)) = freeform_ident(bytes, &child)? {
                        if m == *mean && n == *name {
                            return Ok(Some(child));
                        }
                    }
                }
            }
        }
    }

    Ok(None)
}

/// A fresh `meta` atom wrapping an iTunes handler and an `ilst` with the item.
fn meta_with(item_bytes: &[u8]) -> Vec<u8> {
    let ilst = template::wrap(ITEM_LIST, item_bytes);
    let mut content = vec![0; 4]; // version + flags
    content.extend_from_slice(&template::hdlr_mdir());
    content.extend_from_slice(&ilst);
    template::wrap(METADATA, &content)
}

/// Writes the metadata item into `moov/udta/meta/ilst`, creating missing
/// intermediate atoms, and replacing any existing item with the same
/// identifier.
pub(crate) fn put_meta_item(bytes: &[u8], item: &MetaItem) -> crate::Result<Vec<u8>> {
    let chain = find_meta_chain(bytes)?;
    let item_bytes = item.to_bytes()?;

    let (ancestors, splice) = match (chain.udta, chain.meta, chain.hdlr, chain.ilst) {
        (Some(udta), Some(meta), Some(_), Some(ilst)) => {
            let splice = match find_item_child(bytes, &ilst, &item.ident)? {
                Some(old) => Splice::replace(&old, item_bytes),
                None => Splice::insert(ilst.end(), item_bytes),
            };
            (vec![chain.moov, udta, meta, ilst], splice)
        }
        (Some(udta), Some(meta), Some(_), None) => {
            let splice = Splice::insert(meta.end(), template::wrap(ITEM_LIST, &item_bytes));
            (vec![chain.moov, udta, meta], splice)
        }
        (Some(udta), Some(meta), None, _) => {
            // The meta atom lacks the handler iTunes style readers require.
            // Restore it first, then run the edit on the result.
            let (start, _) = atom::content_window(&meta)?;
            let splice = Splice::insert(start, template::hdlr_mdir());
            let restored = apply(bytes, &[chain.moov, udta, meta], splice)?;
            return put_meta_item(&restored, item);
        }
        (Some(udta), None, _, _) => {
            let splice = Splice::insert(udta.end(), meta_with(&item_bytes));
            (vec![chain.moov, udta], splice)
        }
        (None, _, _, _) => {
            let udta = template::wrap(USER_DATA, &meta_with(&item_bytes));
            let splice = Splice::insert(chain.moov.end(), udta);
            (vec![chain.moov], splice)
        }
    };

    apply(bytes, &ancestors, splice)
}

/// Reads the data of the metadata item matching the identifier.
pub(crate) fn read_meta_item(bytes: &[u8], ident: &DataIdent) -> crate::Result<Option<Data>> {
    let chain = find_meta_chain(bytes)?;
    let ilst = match chain.ilst {
        Some(ilst) => ilst,
        None => return Ok(None),
    };
    let child = match find_item_child(bytes, &ilst, ident)? {
        Some(child) => child,
        None => return Ok(None),
    };

    let mut reader = Cursor::new(bytes);
    reader.seek(SeekFrom::Start(child.content_pos()))?;
    let head = Head::from(child.size(), child.fourcc());
    let item = MetaItem::parse(&mut reader, head)?;

    Ok(Some(item.data))
}

/// Removes the metadata item matching the identifier, if present.
pub(crate) fn remove_meta_item(bytes: &[u8], ident: &DataIdent) -> crate::Result<Vec<u8>> {
    let chain = find_meta_chain(bytes)?;

    if let (Some(udta), Some(meta), Some(ilst)) = (chain.udta, chain.meta, chain.ilst) {
        if let Some(old) = find_item_child(bytes, &ilst, ident)? {
            let ancestors = vec![chain.moov, udta, meta, ilst];
            return apply(bytes, &ancestors, Splice::remove(&old));
        }
    }

    Ok(bytes.to_vec())
}

/// Writes the raw JSON stems manifest as the `stem` child of `moov/udta`,
/// replacing any existing one.
pub(crate) fn put_stem_atom(bytes: &[u8], json: &[u8]) -> crate::Result<Vec<u8>> {
    let chain = find_meta_chain(bytes)?;
    let stem = template::wrap(STEM_MANIFEST, json);

    let (ancestors, splice) = match chain.udta {
        Some(udta) => {
            let splice = match atom::find_child(bytes, &udta, STEM_MANIFEST)? {
                Some(old) => Splice::replace(&old, stem),
                None => Splice::insert(udta.end(), stem),
            };
            (vec![chain.moov, udta], splice)
        }
        None => {
            let udta = template::wrap(USER_DATA, &stem);
            (vec![chain.moov], Splice::insert(chain.moov.end(), udta))
        }
    };

    apply(bytes, &ancestors, splice)
}

/// Reads the raw JSON stems manifest, if present.
pub(crate) fn read_stem_atom(bytes: &[u8]) -> crate::Result<Option<Vec<u8>>> {
    let chain = find_meta_chain(bytes)?;
    let stem = match chain.udta {
        Some(udta) => atom::find_child(bytes, &udta, STEM_MANIFEST)?,
        None => None,
    };

    Ok(stem.map(|s| bytes[s.content_pos() as usize..s.end() as usize].to_vec()))
}

/// Sets or clears the enabled bit of a track's header flags.
pub(crate) fn set_track_enabled(
    bytes: &[u8],
    index: usize,
    enabled: bool,
) -> crate::Result<Vec<u8>> {
    let traks = trak_list(bytes)?;
    let trak = traks.get(index).ok_or_else(|| {
        crate::Error::new(
            ErrorKind::TrackNotFound(index),
            format!("Requested track {index} but the file holds {}", traks.len()),
        )
    })?;
    let tkhd = atom::expect_child(bytes, trak, TRACK_HEADER)?;

    // Bit 0 of the 3 byte flags word following the version byte.
    let flag_pos = tkhd.content_pos() as usize + 3;
    let mut out = bytes.to_vec();
    if enabled {
        out[flag_pos] |= 0x01;
    } else {
        out[flag_pos] &= !0x01;
    }

    Ok(out)
}
