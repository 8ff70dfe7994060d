use std::time::Duration;

use log::{debug, warn};

use crate::atom::ident::*;
use crate::atom::mdhd::{self, Mdhd};
use crate::atom::stco::Stco;
use crate::atom::stsc::{Stsc, StscItem};
use crate::atom::template;
use crate::atom::{self, AtomBounds, WriteAtom};
use crate::sample::SampleMap;
use crate::util::set_be_u32_at;
use crate::ErrorKind;

/// Tuning knobs for track extraction.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Tracks with fewer samples are skipped by [`extract_all_tracks`], a
    /// heuristic that filters out non-audio and metadata tracks.
    ///
    /// [`extract_all_tracks`]: crate::extract_all_tracks
    pub min_sample_count: u32,
    /// The per-sample duration in timescale units assumed when a track
    /// carries no `stts` atom. Defaults to 1024, a typical AAC frame.
    pub fallback_sample_delta: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_sample_count: 100, fallback_sample_delta: 1024 }
    }
}

/// Summary of one track's sample tables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrackInfo {
    /// The 0-based index of the track's `trak` atom inside `moov`.
    pub index: usize,
    /// The number of samples declared by the track's `stsz` atom.
    pub sample_count: u32,
    /// The media timescale in units per second.
    pub timescale: u32,
    /// The media duration.
    pub duration: Duration,
}

/// Returns the bounds of every `trak` atom inside `moov`, in file order.
pub(crate) fn trak_list(bytes: &[u8]) -> crate::Result<Vec<AtomBounds>> {
    let moov = atom::find_top_level(bytes, MOVIE)?.ok_or_else(|| {
        crate::Error::new(
            ErrorKind::AtomNotFound(MOVIE),
            "Missing necessary data, no movie (moov) atom found",
        )
    })?;
    let (start, end) = atom::content_window(&moov)?;
    Ok(atom::scan_atoms(bytes, start, end)?
        .into_iter()
        .filter(|a| a.fourcc() == TRACK)
        .collect())
}

/// Extracts the elementary stream of the 0-based track `index` and wraps it
/// in a minimal standalone MPEG-4 audio file.
pub fn extract_track(bytes: &[u8], index: usize) -> crate::Result<Vec<u8>> {
    extract_track_with(bytes, index, &ExtractConfig::default())
}

/// Same as [`extract_track`] with explicit configuration.
pub fn extract_track_with(
    bytes: &[u8],
    index: usize,
    cfg: &ExtractConfig,
) -> crate::Result<Vec<u8>> {
    let traks = trak_list(bytes)?;
    let trak = traks
        .get(index)
        .ok_or_else(|| {
            crate::Error::new(
                ErrorKind::TrackNotFound(index),
                format!("Requested track {index} but the file holds {}", traks.len()),
            )
        })?;

    let map = SampleMap::parse(bytes, trak, cfg.fallback_sample_delta)?;
    let stream = gather_stream(bytes, &map)?;
    build_single_track(&map, &stream)
}

/// Extracts every track holding at least [`ExtractConfig::min_sample_count`]
/// samples. Tracks that fail to extract are logged and skipped.
pub fn extract_all_tracks(bytes: &[u8]) -> crate::Result<Vec<Vec<u8>>> {
    extract_all_tracks_with(bytes, &ExtractConfig::default())
}

/// Same as [`extract_all_tracks`] with explicit configuration.
pub fn extract_all_tracks_with(
    bytes: &[u8],
    cfg: &ExtractConfig,
) -> crate::Result<Vec<Vec<u8>>> {
    let traks = trak_list(bytes)?;
    let mut out = Vec::with_capacity(traks.len());

    for (i, trak) in traks.iter().enumerate() {
        let map = match SampleMap::parse(bytes, trak, cfg.fallback_sample_delta) {
            Ok(m) => m,
            Err(e) => {
                warn!("skipping track {i}: {e}");
                continue;
            }
        };

        if map.sample_count() < cfg.min_sample_count {
            debug!(
                "skipping track {i} with {} samples, below the threshold of {}",
                map.sample_count(),
                cfg.min_sample_count,
            );
            continue;
        }

        let track = gather_stream(bytes, &map).and_then(|s| build_single_track(&map, &s));
        match track {
            Ok(t) => out.push(t),
            Err(e) => warn!("skipping track {i}: {e}"),
        }
    }

    Ok(out)
}

/// Decodes the sample tables of every track. The returned vector holds one
/// entry per `trak` atom, in file order; tracks whose tables cannot be
/// decoded yield an error in their slot.
pub fn track_info(bytes: &[u8]) -> crate::Result<Vec<crate::Result<TrackInfo>>> {
    let cfg = ExtractConfig::default();
    Ok(trak_list(bytes)?
        .iter()
        .enumerate()
        .map(|(index, trak)| {
            SampleMap::parse(bytes, trak, cfg.fallback_sample_delta).map(|map| TrackInfo {
                index,
                sample_count: map.sample_count(),
                timescale: map.timescale,
                duration: map.duration(),
            })
        })
        .collect())
}

/// Copies the track's samples out of the file, in chunk order, into one
/// contiguous elementary stream.
fn gather_stream(bytes: &[u8], map: &SampleMap) -> crate::Result<Vec<u8>> {
    let mut stream = Vec::with_capacity(map.stream_len() as usize);
    let mut sample = 0;

    for (c, chunk_offset) in map.chunk_offsets.iter().enumerate() {
        let mut pos = *chunk_offset;
        for _ in 0..map.stsc.samples_per_chunk(c as u32 + 1) {
            let len = map.stsz.size_of(sample) as u64;
            let slice = bytes
                .get(pos as usize..(pos + len) as usize)
                .ok_or_else(|| {
                    crate::Error::new(
                        ErrorKind::Truncated,
                        format!("Sample {sample} at {pos} extends past the end of the file"),
                    )
                })?;
            stream.extend_from_slice(slice);
            pos += len;
            sample += 1;
        }
    }

    Ok(stream)
}

/// Wraps an elementary stream in a fresh single-track, single-chunk MPEG-4
/// container, reusing the source's sample description verbatim.
fn build_single_track(map: &SampleMap, stream: &[u8]) -> crate::Result<Vec<u8>> {
    let timescale = map.timescale;
    let duration = map.duration.min(u32::MAX as u64) as u32;

    let stsc = Stsc {
        items: vec![StscItem {
            first_chunk: 1,
            samples_per_chunk: map.sample_count(),
            sample_description_id: 1,
        }],
    };
    let stco = Stco { offsets: vec![0] };
    let mdhd = Mdhd {
        timescale,
        duration: duration as u64,
        language: mdhd::LANGUAGE_UND,
        ..Mdhd::default()
    };

    let stbl = template::container(
        SAMPLE_TABLE,
        &[
            &map.stsd.to_bytes()?,
            &map.stts.to_bytes()?,
            &stsc.to_bytes()?,
            &map.stsz.to_bytes()?,
            &stco.to_bytes()?,
        ],
    );
    let minf = template::container(
        MEDIA_INFORMATION,
        &[&template::smhd(), &template::dinf(), &stbl],
    );
    let mdia = template::container(
        MEDIA,
        &[&mdhd.to_bytes()?, &template::hdlr_soun(), &minf],
    );
    let trak = template::container(TRACK, &[&template::tkhd(duration), &mdia]);
    let moov = template::container(MOVIE, &[&template::mvhd(timescale, duration), &trak]);

    let mut out = template::ftyp();
    out.extend_from_slice(&moov);

    // The single chunk starts right after the mdat head.
    let chunk_offset = out.len() as u64 + 8;
    if chunk_offset > u32::MAX as u64 {
        return Err(crate::Error::new(
            ErrorKind::OffsetOverflow,
            "Synthesized movie atom pushes the chunk offset past 32 bits",
        ));
    }
    patch_chunk_offset(&mut out, chunk_offset as u32)?;

    out.extend_from_slice(&mdat_head(stream.len() as u64));
    out.extend_from_slice(stream);

    Ok(out)
}

/// Locates the single `stco` entry of the synthesized movie and patches the
/// final chunk offset into it.
fn patch_chunk_offset(out: &mut Vec<u8>, chunk_offset: u32) -> crate::Result<()> {
    let mut bounds = atom::find_top_level(out, MOVIE)?.ok_or_else(|| {
        crate::Error::new(ErrorKind::AtomNotFound(MOVIE), "Synthesized movie atom is missing")
    })?;
    for fourcc in [TRACK, MEDIA, MEDIA_INFORMATION, SAMPLE_TABLE, SAMPLE_TABLE_CHUNK_OFFSET] {
        bounds = atom::expect_child(out, &bounds, fourcc)?;
    }

    let entry_pos = bounds.content_pos() + 8;
    set_be_u32_at(out, entry_pos as usize, chunk_offset);
    Ok(())
}

fn mdat_head(stream_len: u64) -> Vec<u8> {
    let mut head = Vec::with_capacity(16);
    if 8 + stream_len > u32::MAX as u64 {
        head.extend_from_slice(&1u32.to_be_bytes());
        head.extend_from_slice(&*MEDIA_DATA);
        head.extend_from_slice(&(16 + stream_len).to_be_bytes());
    } else {
        head.extend_from_slice(&(8 + stream_len as u32).to_be_bytes());
        head.extend_from_slice(&*MEDIA_DATA);
    }
    head
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mdat_heads() {
        assert_eq!(mdat_head(4), [0, 0, 0, 12, b'm', b'd', b'a', b't']);
        let ext = mdat_head(u32::MAX as u64);
        assert_eq!(&ext[..4], &[0, 0, 0, 1]);
        assert_eq!(ext.len(), 16);
    }
}
