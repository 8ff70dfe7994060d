//! Fixed atoms synthesized when building a standalone single-track file, and
//! the `hdlr` required inside a fresh `meta` atom.

use super::*;

/// The identity transformation matrix used by movie and track headers.
const MATRIX: [u32; 9] =
    [0x0001_0000, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000];

/// A fixed point 8.8 volume of 1.0.
const VOLUME: u16 = 0x0100;

pub(crate) fn wrap(fourcc: Fourcc, content: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + content.len());
    buf.extend_from_slice(&(8 + content.len() as u32).to_be_bytes());
    buf.extend_from_slice(&*fourcc);
    buf.extend_from_slice(content);
    buf
}

pub(crate) fn container(fourcc: Fourcc, parts: &[&[u8]]) -> Vec<u8> {
    let content_len: usize = parts.iter().map(|p| p.len()).sum();
    let mut buf = Vec::with_capacity(8 + content_len);
    buf.extend_from_slice(&(8 + content_len as u32).to_be_bytes());
    buf.extend_from_slice(&*fourcc);
    for p in parts {
        buf.extend_from_slice(p);
    }
    buf
}

/// An `ftyp` atom with the `M4A ` major brand.
pub(crate) fn ftyp() -> Vec<u8> {
    let mut content = Vec::with_capacity(20);
    content.extend_from_slice(b"M4A ");
    content.extend_from_slice(&0u32.to_be_bytes());
    content.extend_from_slice(b"M4A ");
    content.extend_from_slice(b"mp42");
    content.extend_from_slice(b"isom");
    wrap(FILETYPE, &content)
}

/// A version 0 `mvhd` atom with an identity matrix, full volume and a next
/// track id of 2.
pub(crate) fn mvhd(timescale: u32, duration: u32) -> Vec<u8> {
    let mut content = Vec::with_capacity(100);
    content.extend_from_slice(&[0; 4]); // version + flags
    content.extend_from_slice(&[0; 8]); // creation + modification time
    content.extend_from_slice(&timescale.to_be_bytes());
    content.extend_from_slice(&duration.to_be_bytes());
    content.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // preferred rate 1.0
    content.extend_from_slice(&VOLUME.to_be_bytes());
    content.extend_from_slice(&[0; 10]); // reserved
    for i in MATRIX {
        content.extend_from_slice(&i.to_be_bytes());
    }
    content.extend_from_slice(&[0; 24]); // predefined
    content.extend_from_slice(&2u32.to_be_bytes()); // next track id
    wrap(MOVIE_HEADER, &content)
}

/// A version 0 `tkhd` atom for track 1, flagged enabled, in movie and in
/// preview.
pub(crate) fn tkhd(duration: u32) -> Vec<u8> {
    let mut content = Vec::with_capacity(84);
    content.extend_from_slice(&[0, 0, 0, 0x07]); // version + flags
    content.extend_from_slice(&[0; 8]); // creation + modification time
    content.extend_from_slice(&1u32.to_be_bytes()); // track id
    content.extend_from_slice(&[0; 4]); // reserved
    content.extend_from_slice(&duration.to_be_bytes());
    content.extend_from_slice(&[0; 8]); // reserved
    content.extend_from_slice(&[0; 4]); // layer + alternate group
    content.extend_from_slice(&VOLUME.to_be_bytes());
    content.extend_from_slice(&[0; 2]); // reserved
    for i in MATRIX {
        content.extend_from_slice(&i.to_be_bytes());
    }
    content.extend_from_slice(&[0; 8]); // width + height
    wrap(TRACK_HEADER, &content)
}

/// A `hdlr` atom naming the sound handler.
pub(crate) fn hdlr_soun() -> Vec<u8> {
    wrap(
        HANDLER_REFERENCE,
        &[
            0x00, 0x00, 0x00, 0x00, // version + flags
            0x00, 0x00, 0x00, 0x00, // component type
            0x73, 0x6f, 0x75, 0x6e, // component subtype 'soun'
            0x00, 0x00, 0x00, 0x00, // component manufacturer
            0x00, 0x00, 0x00, 0x00, // component flags
            0x00, 0x00, 0x00, 0x00, // component flags mask
            0x00, // component name
        ],
    )
}

/// The `hdlr` atom required inside a `meta` atom for iTunes style readers.
pub(crate) fn hdlr_mdir() -> Vec<u8> {
    wrap(
        HANDLER_REFERENCE,
        &[
            0x00, 0x00, 0x00, 0x00, // version + flags
            0x00, 0x00, 0x00, 0x00, // component type
            0x6d, 0x64, 0x69, 0x72, // component subtype 'mdir'
            0x61, 0x70, 0x70, 0x6c, // component manufacturer 'appl'
            0x00, 0x00, 0x00, 0x00, // component flags
            0x00, 0x00, 0x00, 0x00, // component flags mask
            0x00, // component name
        ],
    )
}

/// A `smhd` atom with a centered balance.
pub(crate) fn smhd() -> Vec<u8> {
    wrap(
        SOUND_MEDIA_HEADER,
        &[
            0x00, 0x00, 0x00, 0x00, // version + flags
            0x00, 0x00, // balance
            0x00, 0x00, // reserved
        ],
    )
}

/// A `dinf` atom with a single self-contained `url ` data reference.
pub(crate) fn dinf() -> Vec<u8> {
    let url = wrap(URL_MEDIA, &[0x00, 0x00, 0x00, 0x01]); // flag: self-contained
    let mut dref_content = Vec::with_capacity(8 + url.len());
    dref_content.extend_from_slice(&[0; 4]); // version + flags
    dref_content.extend_from_slice(&1u32.to_be_bytes()); // entry count
    dref_content.extend_from_slice(&url);
    let dref = wrap(DATA_REFERENCE, &dref_content);
    wrap(DATA_INFORMATION, &dref)
}
