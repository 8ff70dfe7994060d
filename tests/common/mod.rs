//! Builds synthetic multi-track stem files fully in memory.
//!
//! The builder assembles atoms byte by byte on purpose, independently of the
//! crate's own writers, so the tests check the parser and the emitter against
//! each other instead of against themselves.
#![allow(dead_code)]

pub const TRACK_COUNT: usize = 5;
pub const SAMPLES: usize = 120;
pub const SAMPLES_PER_CHUNK: usize = 60;
pub const CHUNKS: usize = 2;
pub const TIMESCALE: u32 = 44_100;
pub const SAMPLE_DELTA: u32 = 1024;

pub const TINY_SAMPLES: usize = 3;
pub const TINY_SAMPLE_SIZE: u32 = 10;

/// Description of the synthetic file to build.
pub struct FileSpec {
    /// Place `mdat` before `moov` instead of after it.
    pub mdat_first: bool,
    /// Include the `udta/meta/hdlr/ilst` hierarchy.
    pub with_meta: bool,
    /// Raw metadata item atoms seeded into the `ilst`.
    pub ilst_items: Vec<Vec<u8>>,
    /// Append a short non-audio track that extraction should skip.
    pub tiny_track: bool,
    /// Append a `trak` with no `minf`, whose sample map cannot be decoded.
    pub broken_track: bool,
    /// Leave the `stts` atom out of the audio tracks' sample tables.
    pub omit_stts: bool,
    /// Give the audio tracks 64 bit `co64` chunk offset tables instead of
    /// `stco` ones. The tiny track keeps its `stco`, so the file mixes both.
    pub large_offsets: bool,
}

impl Default for FileSpec {
    fn default() -> Self {
        Self {
            mdat_first: false,
            with_meta: true,
            ilst_items: Vec::new(),
            tiny_track: true,
            broken_track: false,
            omit_stts: false,
            large_offsets: false,
        }
    }
}

/// The default five-track stem file plus one tiny metadata track.
pub fn stem_file() -> Vec<u8> {
    build(&FileSpec::default())
}

pub fn atom(fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + content.len());
    buf.extend_from_slice(&(8 + content.len() as u32).to_be_bytes());
    buf.extend_from_slice(fourcc);
    buf.extend_from_slice(content);
    buf
}

/// The size of the 0-based sample `i` of a track.
pub fn sample_size(track: usize, i: usize) -> u32 {
    40 + ((track * 7 + i) % 9) as u32
}

/// The byte every position of the sample is filled with.
pub fn sample_byte(track: usize, i: usize) -> u8 {
    (track * 31 + i) as u8
}

/// The track's elementary stream: all samples in order.
pub fn track_stream(track: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    for i in 0..SAMPLES {
        buf.extend(std::iter::repeat(sample_byte(track, i)).take(sample_size(track, i) as usize));
    }
    buf
}

fn track_chunk_len(track: usize, chunk: usize) -> u64 {
    let start = chunk * SAMPLES_PER_CHUNK;
    (start..start + SAMPLES_PER_CHUNK).map(|i| sample_size(track, i) as u64).sum()
}

/// Builds a freeform (`----`) item atom with `mean`, `name` and `data`
/// children.
pub fn freeform_item(mean: &str, name: &str, type_code: u32, payload: &[u8]) -> Vec<u8> {
    let mut mean_content = vec![0; 4];
    mean_content.extend_from_slice(mean.as_bytes());
    let mut name_content = vec![0; 4];
    name_content.extend_from_slice(name.as_bytes());

    let mut content = atom(b"mean", &mean_content);
    content.extend_from_slice(&atom(b"name", &name_content));
    content.extend_from_slice(&data_atom(type_code, payload));
    atom(b"----", &content)
}

/// Builds a standard item atom wrapping a single `data` child.
pub fn standard_item(fourcc: &[u8; 4], type_code: u32, payload: &[u8]) -> Vec<u8> {
    atom(fourcc, &data_atom(type_code, payload))
}

fn data_atom(type_code: u32, payload: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(8 + payload.len());
    content.extend_from_slice(&type_code.to_be_bytes());
    content.extend_from_slice(&[0; 4]); // locale
    content.extend_from_slice(payload);
    atom(b"data", &content)
}

fn ftyp() -> Vec<u8> {
    let mut content = Vec::new();
    content.extend_from_slice(b"M4A ");
    content.extend_from_slice(&[0; 4]);
    content.extend_from_slice(b"M4A mp42isom");
    atom(b"ftyp", &content)
}

fn mvhd() -> Vec<u8> {
    let mut content = vec![0; 12]; // version + flags, creation, modification
    content.extend_from_slice(&TIMESCALE.to_be_bytes());
    content.extend_from_slice(&((SAMPLES as u32) * SAMPLE_DELTA).to_be_bytes());
    content.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    content.extend_from_slice(&[0x01, 0x00]); // volume
    content.resize(content.len() + 10, 0);
    for i in [0x0001_0000u32, 0, 0, 0, 0x0001_0000, 0, 0, 0, 0x4000_0000] {
        content.extend_from_slice(&i.to_be_bytes());
    }
    content.resize(content.len() + 24, 0);
    content.extend_from_slice(&(TRACK_COUNT as u32 + 1).to_be_bytes());
    atom(b"mvhd", &content)
}

fn tkhd(id: u32, duration: u32) -> Vec<u8> {
    let mut content = vec![0, 0, 0, 0x07]; // version + flags: enabled, in movie, in preview
    content.extend_from_slice(&[0; 8]); // creation + modification
    content.extend_from_slice(&id.to_be_bytes());
    content.extend_from_slice(&[0; 4]);
    content.extend_from_slice(&duration.to_be_bytes());
    content.resize(content.len() + 60, 0);
    atom(b"tkhd", &content)
}

fn mdhd(duration: u32) -> Vec<u8> {
    let mut content = vec![0; 12];
    content.extend_from_slice(&TIMESCALE.to_be_bytes());
    content.extend_from_slice(&duration.to_be_bytes());
    content.extend_from_slice(&[0x55, 0xc4, 0, 0]); // language und + quality
    atom(b"mdhd", &content)
}

fn hdlr(subtype: &[u8; 4]) -> Vec<u8> {
    let mut content = vec![0; 8];
    content.extend_from_slice(subtype);
    content.extend_from_slice(&[0; 12]);
    content.push(0);
    atom(b"hdlr", &content)
}

fn smhd() -> Vec<u8> {
    atom(b"smhd", &[0; 8])
}

fn dinf() -> Vec<u8> {
    let url = atom(b"url ", &[0, 0, 0, 1]);
    let mut dref_content = vec![0; 4];
    dref_content.extend_from_slice(&1u32.to_be_bytes());
    dref_content.extend_from_slice(&url);
    atom(b"dinf", &atom(b"dref", &dref_content))
}

/// A plausible `mp4a` sample description with a fake `esds` blob.
fn stsd() -> Vec<u8> {
    let mut entry_content = vec![0; 6]; // reserved
    entry_content.extend_from_slice(&1u16.to_be_bytes()); // data reference index
    entry_content.extend_from_slice(&[0; 8]); // version, revision, vendor
    entry_content.extend_from_slice(&2u16.to_be_bytes()); // channels
    entry_content.extend_from_slice(&16u16.to_be_bytes()); // sample size
    entry_content.extend_from_slice(&[0; 4]); // compression id, packet size
    entry_content.extend_from_slice(&(TIMESCALE << 16).to_be_bytes()); // sample rate 16.16
    entry_content.extend_from_slice(&atom(b"esds", &[0, 0, 0, 0, 0x03, 0x19, 0, 2, 0]));
    let entry = atom(b"mp4a", &entry_content);

    let mut content = vec![0; 4];
    content.extend_from_slice(&1u32.to_be_bytes());
    content.extend_from_slice(&entry);
    atom(b"stsd", &content)
}

fn stts(sample_count: u32) -> Vec<u8> {
    let mut content = vec![0; 4];
    content.extend_from_slice(&1u32.to_be_bytes());
    content.extend_from_slice(&sample_count.to_be_bytes());
    content.extend_from_slice(&SAMPLE_DELTA.to_be_bytes());
    atom(b"stts", &content)
}

fn stsc(samples_per_chunk: u32) -> Vec<u8> {
    let mut content = vec![0; 4];
    content.extend_from_slice(&1u32.to_be_bytes());
    content.extend_from_slice(&1u32.to_be_bytes());
    content.extend_from_slice(&samples_per_chunk.to_be_bytes());
    content.extend_from_slice(&1u32.to_be_bytes());
    atom(b"stsc", &content)
}

fn stsz_variable(track: usize) -> Vec<u8> {
    let mut content = vec![0; 4];
    content.extend_from_slice(&0u32.to_be_bytes());
    content.extend_from_slice(&(SAMPLES as u32).to_be_bytes());
    for i in 0..SAMPLES {
        content.extend_from_slice(&sample_size(track, i).to_be_bytes());
    }
    atom(b"stsz", &content)
}

fn stsz_fixed(sample_count: u32, size: u32) -> Vec<u8> {
    let mut content = vec![0; 4];
    content.extend_from_slice(&size.to_be_bytes());
    content.extend_from_slice(&sample_count.to_be_bytes());
    atom(b"stsz", &content)
}

fn stco(offsets: &[u32]) -> Vec<u8> {
    let mut content = vec![0; 4];
    content.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
    for o in offsets {
        content.extend_from_slice(&o.to_be_bytes());
    }
    atom(b"stco", &content)
}

fn co64(offsets: &[u32]) -> Vec<u8> {
    let mut content = vec![0; 4];
    content.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
    for o in offsets {
        content.extend_from_slice(&(*o as u64).to_be_bytes());
    }
    atom(b"co64", &content)
}

fn audio_trak(track: usize, chunk_offsets: &[u32], spec: &FileSpec) -> Vec<u8> {
    let duration = SAMPLES as u32 * SAMPLE_DELTA;
    let mut stbl_content = stsd();
    if !spec.omit_stts {
        stbl_content.extend_from_slice(&stts(SAMPLES as u32));
    }
    stbl_content.extend_from_slice(&stsc(SAMPLES_PER_CHUNK as u32));
    stbl_content.extend_from_slice(&stsz_variable(track));
    if spec.large_offsets {
        stbl_content.extend_from_slice(&co64(chunk_offsets));
    } else {
        stbl_content.extend_from_slice(&stco(chunk_offsets));
    }
    let stbl = atom(b"stbl", &stbl_content);

    let mut minf_content = smhd();
    minf_content.extend_from_slice(&dinf());
    minf_content.extend_from_slice(&stbl);
    let minf = atom(b"minf", &minf_content);

    let mut mdia_content = mdhd(duration);
    mdia_content.extend_from_slice(&hdlr(b"soun"));
    mdia_content.extend_from_slice(&minf);
    let mdia = atom(b"mdia", &mdia_content);

    let mut trak_content = tkhd(track as u32 + 1, duration);
    trak_content.extend_from_slice(&mdia);
    atom(b"trak", &trak_content)
}

fn tiny_trak(id: u32, chunk_offset: u32) -> Vec<u8> {
    let duration = TINY_SAMPLES as u32 * SAMPLE_DELTA;
    let mut stbl_content = stsd();
    stbl_content.extend_from_slice(&stts(TINY_SAMPLES as u32));
    stbl_content.extend_from_slice(&stsc(TINY_SAMPLES as u32));
    stbl_content.extend_from_slice(&stsz_fixed(TINY_SAMPLES as u32, TINY_SAMPLE_SIZE));
    stbl_content.extend_from_slice(&stco(&[chunk_offset]));
    let stbl = atom(b"stbl", &stbl_content);

    let mut minf_content = smhd();
    minf_content.extend_from_slice(&dinf());
    minf_content.extend_from_slice(&stbl);
    let minf = atom(b"minf", &minf_content);

    let mut mdia_content = mdhd(duration);
    mdia_content.extend_from_slice(&hdlr(b"soun"));
    mdia_content.extend_from_slice(&minf);
    let mdia = atom(b"mdia", &mdia_content);

    let mut trak_content = tkhd(id, duration);
    trak_content.extend_from_slice(&mdia);
    atom(b"trak", &trak_content)
}

fn broken_trak(id: u32) -> Vec<u8> {
    let mut mdia_content = mdhd(0);
    mdia_content.extend_from_slice(&hdlr(b"soun"));
    let mdia = atom(b"mdia", &mdia_content);

    let mut trak_content = tkhd(id, 0);
    trak_content.extend_from_slice(&mdia);
    atom(b"trak", &trak_content)
}

fn udta(items: &[Vec<u8>]) -> Vec<u8> {
    let mut ilst_content = Vec::new();
    for i in items {
        ilst_content.extend_from_slice(i);
    }
    let ilst = atom(b"ilst", &ilst_content);

    let mut meta_content = vec![0; 4];
    meta_content.extend_from_slice(&hdlr(b"mdir"));
    meta_content.extend_from_slice(&ilst);
    let meta = atom(b"meta", &meta_content);

    atom(b"udta", &meta)
}

/// The `mdat` content: each track's chunks in track order, then the tiny
/// track's single chunk.
fn mdat_content(spec: &FileSpec) -> Vec<u8> {
    let mut buf = Vec::new();
    for t in 0..TRACK_COUNT {
        buf.extend_from_slice(&track_stream(t));
    }
    if spec.tiny_track {
        for i in 0..TINY_SAMPLES {
            buf.extend(std::iter::repeat(0xe0 + i as u8).take(TINY_SAMPLE_SIZE as usize));
        }
    }
    buf
}

fn moov(spec: &FileSpec, mdat_content_start: u32) -> Vec<u8> {
    let mut content = mvhd();

    let mut pos = mdat_content_start;
    for t in 0..TRACK_COUNT {
        let mut offsets = Vec::with_capacity(CHUNKS);
        for c in 0..CHUNKS {
            offsets.push(pos);
            pos += track_chunk_len(t, c) as u32;
        }
        content.extend_from_slice(&audio_trak(t, &offsets, spec));
    }
    if spec.tiny_track {
        content.extend_from_slice(&tiny_trak(TRACK_COUNT as u32 + 1, pos));
    }
    if spec.broken_track {
        content.extend_from_slice(&broken_trak(TRACK_COUNT as u32 + 2));
    }

    if spec.with_meta {
        content.extend_from_slice(&udta(&spec.ilst_items));
    }

    atom(b"moov", &content)
}

/// Assembles the described file.
pub fn build(spec: &FileSpec) -> Vec<u8> {
    let ftyp = ftyp();
    let mdat = atom(b"mdat", &mdat_content(spec));

    let mut file = ftyp;
    if spec.mdat_first {
        let mdat_content_start = file.len() as u32 + 8;
        let moov = moov(spec, mdat_content_start);
        file.extend_from_slice(&mdat);
        file.extend_from_slice(&moov);
    } else {
        // The moov length doesn't depend on the offset values, so build it
        // once to measure and once with the final offsets.
        let probe = moov(spec, 0);
        let mdat_content_start = file.len() as u32 + probe.len() as u32 + 8;
        let moov = moov(spec, mdat_content_start);
        assert_eq!(probe.len(), moov.len());
        file.extend_from_slice(&moov);
        file.extend_from_slice(&mdat);
    }
    file
}
