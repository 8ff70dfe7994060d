use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::ops::Deref;

use crate::util::*;
use crate::ErrorKind;

pub use head::*;
pub use ident::*;

pub use data::Data;
pub use metaitem::MetaItem;

/// A module for working with identifiers.
pub mod ident;

pub(crate) mod co64;
pub(crate) mod data;
pub(crate) mod head;
pub(crate) mod mdhd;
pub(crate) mod metaitem;
pub(crate) mod stco;
pub(crate) mod stsc;
pub(crate) mod stsd;
pub(crate) mod stsz;
pub(crate) mod stts;
pub(crate) mod template;

/// The set of atoms whose content is a list of child atoms.
///
/// `meta` is special: its children begin after a 4 byte version and flags
/// word, all other containers' children begin immediately after the head.
const CONTAINERS: [Fourcc; 10] = [
    MOVIE,
    TRACK,
    MEDIA,
    MEDIA_INFORMATION,
    SAMPLE_TABLE,
    USER_DATA,
    METADATA,
    ITEM_LIST,
    EDITS,
    FREEFORM,
];

pub(crate) fn is_container(fourcc: Fourcc) -> bool {
    CONTAINERS.contains(&fourcc)
}

/// A trait providing the fourcc of an atom.
pub(crate) trait Atom {
    const FOURCC: Fourcc;
}

/// A trait for parsing an atom's content.
///
/// The reader is expected to be positioned at the start of the atom's content,
/// right after the head.
pub(crate) trait ParseAtom: Atom + Sized {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self>;

    fn parse(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        match Self::parse_atom(reader, size) {
            Ok(a) => Ok(a),
            Err(e) => Err(crate::Error::new(
                e.kind,
                format!("Error reading {}: {}", Self::FOURCC, e.description),
            )),
        }
    }
}

/// A trait for writing a complete atom including its head.
pub(crate) trait WriteAtom: Atom {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()>;

    fn size(&self) -> Size;

    fn write_head(&self, writer: &mut impl Write) -> crate::Result<()> {
        head::write_head(writer, Head::from(self.size(), Self::FOURCC))
    }

    fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_atom(writer)
    }

    fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len() as usize);
        self.write(&mut buf)?;
        Ok(buf)
    }

    fn len(&self) -> u64 {
        self.size().len()
    }
}

/// Seeks to the content of `bounds` and parses it as `T`.
pub(crate) fn parse_at<T: ParseAtom>(
    reader: &mut (impl Read + Seek),
    bounds: &AtomBounds,
) -> crate::Result<T> {
    reader.seek(SeekFrom::Start(bounds.content_pos()))?;
    T::parse(reader, bounds.size())
}

/// Scans the window `[start, end)` of the buffer and returns the bounds of
/// every atom in it.
///
/// An atom with a length field of 0 extends to the end of the window and
/// terminates the scan.
pub(crate) fn scan_atoms(bytes: &[u8], start: u64, end: u64) -> crate::Result<Vec<AtomBounds>> {
    let mut reader = Cursor::new(bytes);
    let mut atoms = Vec::new();
    let mut pos = start;

    while pos < end {
        reader.seek(SeekFrom::Start(pos))?;
        let head = parse_head(&mut reader, end)?;
        atoms.push(AtomBounds::new(pos, head));
        pos += head.len();
    }

    Ok(atoms)
}

/// Returns the window of a container atom's children.
pub(crate) fn content_window(bounds: &AtomBounds) -> crate::Result<(u64, u64)> {
    let mut start = bounds.content_pos();
    if bounds.fourcc() == METADATA {
        if bounds.content_len() < 4 {
            return Err(crate::Error::new(
                ErrorKind::Truncated,
                "Metadata (meta) atom is too short to hold its version and flags",
            ));
        }
        start += 4;
    }
    Ok((start, bounds.end()))
}

/// Returns the bounds of the first child of `parent` matching the fourcc.
pub(crate) fn find_child(
    bytes: &[u8],
    parent: &AtomBounds,
    fourcc: Fourcc,
) -> crate::Result<Option<AtomBounds>> {
    let (start, end) = content_window(parent)?;
    Ok(scan_atoms(bytes, start, end)?.into_iter().find(|a| a.fourcc() == fourcc))
}

/// Returns the bounds of the first top level atom matching the fourcc.
pub(crate) fn find_top_level(bytes: &[u8], fourcc: Fourcc) -> crate::Result<Option<AtomBounds>> {
    Ok(scan_atoms(bytes, 0, bytes.len() as u64)?.into_iter().find(|a| a.fourcc() == fourcc))
}

/// Returns the bounds of the first child of `parent` matching the fourcc, or
/// an [`ErrorKind::AtomNotFound`] error.
pub(crate) fn expect_child(
    bytes: &[u8],
    parent: &AtomBounds,
    fourcc: Fourcc,
) -> crate::Result<AtomBounds> {
    find_child(bytes, parent, fourcc)?.ok_or_else(|| {
        crate::Error::new(
            ErrorKind::AtomNotFound(fourcc),
            format!("Missing necessary data, no {fourcc} atom found inside {}", parent.fourcc()),
        )
    })
}

/// A node of the parsed atom tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AtomNode {
    /// The 4 byte identifier of the atom.
    pub fourcc: Fourcc,
    /// The absolute offset of the atom in the buffer.
    pub offset: u64,
    /// The total length of the atom including its head.
    pub len: u64,
    /// The length of the head, 8 or 16 bytes.
    pub head_len: u8,
    /// The materialized children, empty for non-container atoms and atoms
    /// below the depth cap.
    pub children: Vec<AtomNode>,
}

impl AtomNode {
    /// Returns a reference to the first child matching the fourcc, if present.
    pub fn child(&self, fourcc: Fourcc) -> Option<&AtomNode> {
        self.children.iter().find(|a| a.fourcc == fourcc)
    }
}

/// Parses the ordered atom tree of the buffer, materializing the children of
/// known container atoms up to `max_depth` levels deep.
pub fn parse_tree(bytes: &[u8], max_depth: u8) -> crate::Result<Vec<AtomNode>> {
    parse_nodes(bytes, 0, bytes.len() as u64, max_depth)
}

fn parse_nodes(bytes: &[u8], start: u64, end: u64, depth: u8) -> crate::Result<Vec<AtomNode>> {
    let mut nodes = Vec::new();

    for bounds in scan_atoms(bytes, start, end)? {
        let children = if depth > 0 && is_container(bounds.fourcc()) {
            let (cstart, cend) = content_window(&bounds)?;
            parse_nodes(bytes, cstart, cend, depth - 1)?
        } else {
            Vec::new()
        };

        nodes.push(AtomNode {
            fourcc: bounds.fourcc(),
            offset: bounds.pos(),
            len: bounds.len(),
            head_len: bounds.head_len() as u8,
            children,
        });
    }

    Ok(nodes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn atom(fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(8 + content.len() as u32).to_be_bytes());
        buf.extend_from_slice(fourcc);
        buf.extend_from_slice(content);
        buf
    }

    #[test]
    fn nested_tree() {
        let ilst = atom(b"ilst", &[]);
        let mut meta_content = vec![0; 4];
        meta_content.extend_from_slice(&ilst);
        let meta = atom(b"meta", &meta_content);
        let udta = atom(b"udta", &meta);
        let moov = atom(b"moov", &udta);
        let mut file = atom(b"ftyp", b"M4A \x00\x00\x00\x00");
        file.extend_from_slice(&moov);

        let tree = parse_tree(&file, 10).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].fourcc, FILETYPE);
        let moov = &tree[1];
        assert_eq!(moov.fourcc, MOVIE);
        let ilst = moov
            .child(USER_DATA)
            .and_then(|a| a.child(METADATA))
            .and_then(|a| a.child(ITEM_LIST))
            .unwrap();
        assert_eq!(ilst.len, 8);
    }

    #[test]
    fn depth_cap() {
        let udta = atom(b"udta", &atom(b"meta", &[0; 4]));
        let moov = atom(b"moov", &udta);

        let tree = parse_tree(&moov, 1).unwrap();
        assert_eq!(tree[0].children.len(), 1);
        assert!(tree[0].children[0].children.is_empty());
    }

    #[test]
    fn truncated_child() {
        let mut moov = atom(b"moov", &[0, 0, 0, 64, b'u', b'd', b't', b'a']);
        moov.truncate(16);
        set_be_u32_at(&mut moov, 0, 16);

        let err = parse_tree(&moov, 4).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Truncated));
    }
}
