//! Track extraction against synthetic multi-track stem files.

mod common;

use common::*;
use mp4stems::{
    extract_all_tracks, extract_track, parse_tree, track_info, AtomNode, ErrorKind, FILETYPE,
    MEDIA_DATA, MOVIE,
};

fn be_u32(bytes: &[u8], i: usize) -> u32 {
    u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
}

/// Walks `moov/trak/mdia/minf/stbl` of a single-track file and returns the
/// named sample table atom.
fn stbl_child<'a>(tree: &'a [AtomNode], fourcc: &[u8; 4]) -> &'a AtomNode {
    tree.iter()
        .find(|a| a.fourcc == MOVIE)
        .and_then(|moov| moov.children.iter().find(|a| &*a.fourcc == b"trak"))
        .and_then(|trak| trak.child("mdia".parse().unwrap()))
        .and_then(|mdia| mdia.child("minf".parse().unwrap()))
        .and_then(|minf| minf.child("stbl".parse().unwrap()))
        .and_then(|stbl| stbl.children.iter().find(|a| &*a.fourcc == fourcc))
        .expect("sample table atom")
}

#[test]
fn extract_mixdown() {
    let file = stem_file();
    let out = extract_track(&file, 0).unwrap();

    assert_eq!(&out[4..8], b"ftyp");
    assert_eq!(&out[8..12], b"M4A ");

    let tree = parse_tree(&out, 6).unwrap();
    let fourccs: Vec<_> = tree.iter().map(|a| a.fourcc).collect();
    assert_eq!(fourccs, [FILETYPE, MOVIE, MEDIA_DATA]);

    // The sample count survives into the synthesized size table.
    let stsz = stbl_child(&tree, b"stsz");
    assert_eq!(be_u32(&out, stsz.offset as usize + 16), SAMPLES as u32);

    // The single chunk offset points right past the mdat head.
    let mdat = &tree[2];
    let stco = stbl_child(&tree, b"stco");
    assert_eq!(be_u32(&out, stco.offset as usize + 16) as u64, mdat.offset + 8);

    // The media payload is the track's elementary stream, byte for byte.
    assert_eq!(&out[(mdat.offset + 8) as usize..], &track_stream(0)[..]);

    // The sample description is carried over verbatim.
    assert!(out.windows(4).any(|w| w == b"mp4a"));
    assert!(out.windows(4).any(|w| w == b"esds"));
}

#[test]
fn extract_every_stem() {
    let file = stem_file();
    for t in 0..TRACK_COUNT {
        let out = extract_track(&file, t).unwrap();
        let tree = parse_tree(&out, 2).unwrap();
        let mdat = tree.iter().find(|a| a.fourcc == MEDIA_DATA).unwrap();
        assert_eq!(&out[(mdat.offset + 8) as usize..], &track_stream(t)[..]);
    }
}

#[test]
fn extracted_sizes_are_similar() {
    let file = stem_file();
    let outs = extract_all_tracks(&file).unwrap();

    // The tiny track is skipped by the sample count heuristic.
    assert_eq!(outs.len(), TRACK_COUNT);

    let mean = outs.iter().map(|o| o.len() as f64).sum::<f64>() / outs.len() as f64;
    for out in &outs {
        let deviation = (out.len() as f64 - mean).abs() / mean;
        assert!(deviation < 0.3, "deviation {deviation} exceeds 30%");
    }
}

#[test]
fn out_of_range_track() {
    let file = stem_file();
    let err = extract_track(&file, 99).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TrackNotFound(99)));
}

#[test]
fn missing_movie_atom() {
    let file = atom(b"ftyp", b"M4A \x00\x00\x00\x00M4A mp42isom");
    let err = extract_track(&file, 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AtomNotFound(MOVIE)));
}

#[test]
fn undecodable_track_is_skipped() {
    let file = build(&FileSpec { broken_track: true, ..FileSpec::default() });
    let outs = extract_all_tracks(&file).unwrap();
    assert_eq!(outs.len(), TRACK_COUNT);
}

#[test]
fn track_info_reports_per_track() {
    let file = build(&FileSpec { broken_track: true, ..FileSpec::default() });
    let infos = track_info(&file).unwrap();
    assert_eq!(infos.len(), TRACK_COUNT + 2);

    for info in &infos[..TRACK_COUNT] {
        let info = info.as_ref().unwrap();
        assert_eq!(info.sample_count, SAMPLES as u32);
        assert_eq!(info.timescale, TIMESCALE);

        let expected = SAMPLES as f64 * SAMPLE_DELTA as f64 / TIMESCALE as f64;
        assert!((info.duration.as_secs_f64() - expected).abs() < 1e-6);
    }

    assert_eq!(infos[TRACK_COUNT].as_ref().unwrap().sample_count, TINY_SAMPLES as u32);
    assert!(infos[TRACK_COUNT + 1].is_err());
}

#[test]
fn co64_chunk_offsets() {
    let file = build(&FileSpec { large_offsets: true, ..FileSpec::default() });
    for t in 0..TRACK_COUNT {
        let out = extract_track(&file, t).unwrap();
        let tree = parse_tree(&out, 2).unwrap();
        let mdat = tree.iter().find(|a| a.fourcc == MEDIA_DATA).unwrap();
        assert_eq!(&out[(mdat.offset + 8) as usize..], &track_stream(t)[..]);
    }
}

#[test]
fn mdat_before_moov_layout() {
    let file = build(&FileSpec { mdat_first: true, ..FileSpec::default() });
    let out = extract_track(&file, 1).unwrap();
    let tree = parse_tree(&out, 2).unwrap();
    let mdat = tree.iter().find(|a| a.fourcc == MEDIA_DATA).unwrap();
    assert_eq!(&out[(mdat.offset + 8) as usize..], &track_stream(1)[..]);
}

#[test]
fn missing_stts_gets_synthesized() {
    let file = build(&FileSpec { omit_stts: true, ..FileSpec::default() });
    let out = extract_track(&file, 0).unwrap();

    let tree = parse_tree(&out, 6).unwrap();
    let stts = stbl_child(&tree, b"stts");
    let pos = stts.offset as usize;
    assert_eq!(be_u32(&out, pos + 12), 1); // one entry
    assert_eq!(be_u32(&out, pos + 16), SAMPLES as u32);
    assert_eq!(be_u32(&out, pos + 20), 1024); // typical AAC frame length
}

#[test]
fn parse_tree_is_idempotent() {
    let file = stem_file();
    let first = parse_tree(&file, 8).unwrap();
    let second = parse_tree(&file, 8).unwrap();
    assert_eq!(first, second);
}
