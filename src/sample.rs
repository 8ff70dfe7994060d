use std::io::Cursor;
use std::time::Duration;

use crate::atom::co64::Co64;
use crate::atom::ident::*;
use crate::atom::mdhd::Mdhd;
use crate::atom::stco::Stco;
use crate::atom::stsc::Stsc;
use crate::atom::stsd::Stsd;
use crate::atom::stsz::Stsz;
use crate::atom::stts::{Stts, SttsItem};
use crate::atom::{self, AtomBounds};
use crate::util::scale_duration;
use crate::ErrorKind;

/// The decoded sample tables of one track, giving every sample a locatable
/// position and size in the file.
#[derive(Clone, Debug)]
pub(crate) struct SampleMap {
    /// The chunk offsets, merged from `stco` or `co64`. Absolute positions in
    /// the file.
    pub chunk_offsets: Vec<u64>,
    pub stsz: Stsz,
    pub stsc: Stsc,
    pub stts: Stts,
    pub stsd: Stsd,
    /// The media timescale in units per second.
    pub timescale: u32,
    /// The media duration in timescale units.
    pub duration: u64,
}

impl SampleMap {
    /// Decodes the sample tables of the `trak` atom.
    ///
    /// A missing `stts` is tolerated and replaced by a single entry declaring
    /// `fallback_sample_delta` timescale units per sample.
    pub fn parse(
        bytes: &[u8],
        trak: &AtomBounds,
        fallback_sample_delta: u32,
    ) -> crate::Result<Self> {
        let mdia = atom::expect_child(bytes, trak, MEDIA)?;
        let mdhd = atom::expect_child(bytes, &mdia, MEDIA_HEADER)?;
        let minf = atom::expect_child(bytes, &mdia, MEDIA_INFORMATION)?;
        let stbl = atom::expect_child(bytes, &minf, SAMPLE_TABLE)?;

        let stsd = atom::expect_child(bytes, &stbl, SAMPLE_TABLE_SAMPLE_DESCRIPTION)?;
        let stsz = atom::expect_child(bytes, &stbl, SAMPLE_TABLE_SAMPLE_SIZE)?;
        let stsc = atom::expect_child(bytes, &stbl, SAMPLE_TABLE_SAMPLE_TO_CHUNK)?;
        let stts = atom::find_child(bytes, &stbl, SAMPLE_TABLE_TIME_TO_SAMPLE)?;

        let mut reader = Cursor::new(bytes);
        let mdhd: Mdhd = atom::parse_at(&mut reader, &mdhd)?;
        let stsd: Stsd = atom::parse_at(&mut reader, &stsd)?;
        let stsz: Stsz = atom::parse_at(&mut reader, &stsz)?;
        let stsc: Stsc = atom::parse_at(&mut reader, &stsc)?;

        let chunk_offsets = match atom::find_child(bytes, &stbl, SAMPLE_TABLE_CHUNK_OFFSET)? {
            Some(stco) => {
                let stco: Stco = atom::parse_at(&mut reader, &stco)?;
                stco.offsets.iter().map(|o| *o as u64).collect()
            }
            None => {
                let co64 = atom::find_child(bytes, &stbl, SAMPLE_TABLE_CHUNK_OFFSET_64)?
                    .ok_or_else(|| {
                        crate::Error::new(
                            ErrorKind::AtomNotFound(SAMPLE_TABLE_CHUNK_OFFSET),
                            "Missing necessary data, no chunk offset (stco or co64) atom found",
                        )
                    })?;
                let co64: Co64 = atom::parse_at(&mut reader, &co64)?;
                co64.offsets
            }
        };

        let stts = match stts {
            Some(stts) => atom::parse_at(&mut reader, &stts)?,
            None => Stts {
                items: vec![SttsItem {
                    sample_count: stsz.sample_count,
                    sample_duration: fallback_sample_delta,
                }],
            },
        };

        let map = Self {
            chunk_offsets,
            stsz,
            stsc,
            stts,
            stsd,
            timescale: mdhd.timescale,
            duration: mdhd.duration,
        };
        map.validate()?;

        Ok(map)
    }

    /// Checks that the sample to chunk table covers the chunk offset table
    /// and accounts for every sample.
    fn validate(&self) -> crate::Result<()> {
        let chunks = self.chunk_offsets.len() as u32;

        if let Some(last) = self.stsc.items.last() {
            if last.first_chunk > chunks {
                return Err(crate::Error::new(
                    ErrorKind::InvalidContainer,
                    "Sample to chunk (stsc) table references more chunks than the offset table holds",
                ));
            }
        } else if chunks > 0 || self.stsz.sample_count > 0 {
            return Err(crate::Error::new(
                ErrorKind::InvalidContainer,
                "Sample to chunk (stsc) table is empty",
            ));
        }

        let mapped: u64 =
            (1..=chunks).map(|k| self.stsc.samples_per_chunk(k) as u64).sum();
        if mapped != self.stsz.sample_count as u64 {
            return Err(crate::Error::new(
                ErrorKind::InvalidContainer,
                format!(
                    "Sample to chunk (stsc) table maps {} samples but the size table declares {}",
                    mapped, self.stsz.sample_count,
                ),
            ));
        }

        Ok(())
    }

    pub fn sample_count(&self) -> u32 {
        self.stsz.sample_count
    }

    /// The summed length of the track's elementary stream in bytes.
    pub fn stream_len(&self) -> u64 {
        self.stsz.total_size()
    }

    pub fn duration(&self) -> Duration {
        scale_duration(self.timescale, self.duration)
    }
}
