//! A library for reading and surgically editing multi-track MPEG-4 stem
//! audio files and their karaoke metadata.
//!
//! A stem file carries one pre-rendered mixdown track plus isolated stem
//! tracks (drums, bass, other, vocals), iTunes style metadata, and a set of
//! freeform atoms holding timed lyrics, a vocal pitch curve and onset
//! timestamps. All operations here work on in-memory buffers: they take the
//! file's bytes and return new bytes, keeping the sample table chunk offsets
//! valid across every edit.
//!
//! # Examples
//!
//! ## Extracting the mixdown
//! ```no_run
//! let bytes = mp4stems::read_file("song.stem.m4a").unwrap();
//!
//! let mixdown = mp4stems::extract_track(&bytes, 0).unwrap();
//! std::fs::write("mixdown.m4a", mixdown).unwrap();
//! ```
//!
//! ## Tagging
//! ```no_run
//! mp4stems::update_file("song.stem.m4a", |bytes| {
//!     let bytes = mp4stems::write_title(bytes, "TEST TITLE")?;
//!     let bytes = mp4stems::write_tempo(&bytes, 120)?;
//!     mp4stems::write_musical_key(&bytes, "Am")
//! })
//! .unwrap();
//! ```
//!
//! ## Timed lyrics
//! ```no_run
//! use mp4stems::{Line, Lyrics};
//!
//! let bytes = mp4stems::read_file("song.stem.m4a").unwrap();
//!
//! let mut lyrics = mp4stems::read_lyrics(&bytes).unwrap().unwrap_or_default();
//! lyrics.lines.push(Line {
//!     start: 0.5,
//!     end: 2.0,
//!     text: "hello".to_owned(),
//!     ..Default::default()
//! });
//!
//! let bytes = mp4stems::write_lyrics(&bytes, &lyrics).unwrap();
//! std::fs::write("song.stem.m4a", bytes).unwrap();
//! ```
#![warn(missing_docs)]

pub use crate::atom::ident::*;
pub use crate::atom::{ident, parse_tree, AtomNode, Data, MetaItem};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::extract::{
    extract_all_tracks, extract_all_tracks_with, extract_track, extract_track_with, track_info,
    ExtractConfig, TrackInfo,
};
pub use crate::file::{read_file, update_file};
pub use crate::lyrics::{AudioProperties, Line, Lyrics, Singer, Timing, Word};
pub use crate::payload::{Onsets, PitchCurve, PitchPoint};
pub use crate::stem::{Compressor, Limiter, MasteringDsp, StemEntry, StemManifest};

mod atom;
mod edit;
mod error;
mod extract;
mod file;
mod lyrics;
mod payload;
mod sample;
mod stem;
mod util;

/// Writes a freeform (`----`) metadata item keyed by `(mean, name)`,
/// replacing any existing item with the same key.
pub fn write_freeform(bytes: &[u8], mean: &str, name: &str, data: Data) -> Result<Vec<u8>> {
    let item = MetaItem::new(DataIdent::freeform(mean, name), data);
    edit::put_meta_item(bytes, &item)
}

/// Reads the data of the freeform (`----`) metadata item keyed by
/// `(mean, name)`.
pub fn read_freeform(bytes: &[u8], mean: &str, name: &str) -> Result<Option<Data>> {
    edit::read_meta_item(bytes, &DataIdent::freeform(mean, name))
}

/// Removes the freeform (`----`) metadata item keyed by `(mean, name)`, if
/// present.
pub fn remove_freeform(bytes: &[u8], mean: &str, name: &str) -> Result<Vec<u8>> {
    edit::remove_meta_item(bytes, &DataIdent::freeform(mean, name))
}

/// Writes a standard iTunes style text atom, replacing any existing one with
/// the same fourcc.
pub fn write_itunes_text(bytes: &[u8], fourcc: Fourcc, text: &str) -> Result<Vec<u8>> {
    let item = MetaItem::new(DataIdent::Fourcc(fourcc), Data::Utf8(text.to_owned()));
    edit::put_meta_item(bytes, &item)
}

/// Reads the text of a standard iTunes style atom. Returns `None` when the
/// atom is absent or doesn't hold utf-8 text.
pub fn read_itunes_text(bytes: &[u8], fourcc: Fourcc) -> Result<Option<String>> {
    Ok(edit::read_meta_item(bytes, &DataIdent::Fourcc(fourcc))?.and_then(Data::into_string))
}

/// Writes the tempo (`tmpo`) atom as a big-endian integer of type code 21.
pub fn write_tempo(bytes: &[u8], bpm: u16) -> Result<Vec<u8>> {
    let item = MetaItem::new(DataIdent::Fourcc(BPM), payload::tempo_data(bpm));
    edit::put_meta_item(bytes, &item)
}

/// Writes the track number (`trkn`) atom.
pub fn write_track_number(bytes: &[u8], number: u16, total: u16) -> Result<Vec<u8>> {
    let item =
        MetaItem::new(DataIdent::Fourcc(TRACK_NUMBER), payload::track_number_data(number, total));
    edit::put_meta_item(bytes, &item)
}

/// Writes the raw JSON stems manifest as the `stem` child of `moov/udta`,
/// replacing any existing one.
pub fn write_stem_json(bytes: &[u8], json: &[u8]) -> Result<Vec<u8>> {
    edit::put_stem_atom(bytes, json)
}

/// Reads the raw JSON stems manifest, if present.
pub fn read_stem_json(bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    edit::read_stem_atom(bytes)
}

/// Serializes and writes the stems manifest.
pub fn write_stem_manifest(bytes: &[u8], manifest: &StemManifest) -> Result<Vec<u8>> {
    edit::put_stem_atom(bytes, &manifest.to_json()?)
}

/// Reads and parses the stems manifest, if present.
pub fn read_stem_manifest(bytes: &[u8]) -> Result<Option<StemManifest>> {
    edit::read_stem_atom(bytes)?.map(|json| StemManifest::from_json(&json)).transpose()
}

/// Serializes and writes the timed lyrics document
/// (`----:com.stems:kara`).
pub fn write_lyrics(bytes: &[u8], lyrics: &Lyrics) -> Result<Vec<u8>> {
    let json = String::from_utf8(lyrics.to_json()?)?;
    write_freeform(bytes, LYRICS.mean, LYRICS.name, Data::Utf8(json))
}

/// Reads and parses the timed lyrics document, if present.
pub fn read_lyrics(bytes: &[u8]) -> Result<Option<Lyrics>> {
    read_freeform(bytes, LYRICS.mean, LYRICS.name)?
        .map(|data| Lyrics::from_json(data.bytes()))
        .transpose()
}

/// Encodes and writes the vocal pitch curve (`----:com.stems:vpch`).
pub fn write_pitch_curve(bytes: &[u8], curve: &PitchCurve) -> Result<Vec<u8>> {
    write_freeform(bytes, VOCAL_PITCH.mean, VOCAL_PITCH.name, Data::Reserved(curve.to_bytes()))
}

/// Reads and decodes the vocal pitch curve, if present.
pub fn read_pitch_curve(bytes: &[u8]) -> Result<Option<PitchCurve>> {
    read_freeform(bytes, VOCAL_PITCH.mean, VOCAL_PITCH.name)?
        .map(|data| PitchCurve::from_bytes(data.bytes()))
        .transpose()
}

/// Encodes and writes the onset timestamp list (`----:com.stems:kons`).
pub fn write_onsets(bytes: &[u8], onsets: &Onsets) -> Result<Vec<u8>> {
    write_freeform(bytes, ONSETS.mean, ONSETS.name, Data::Reserved(onsets.to_bytes()))
}

/// Reads and decodes the onset timestamp list, if present.
pub fn read_onsets(bytes: &[u8]) -> Result<Option<Onsets>> {
    read_freeform(bytes, ONSETS.mean, ONSETS.name)?
        .map(|data| Onsets::from_bytes(data.bytes()))
        .transpose()
}

/// Writes the musical key (`----:com.apple.iTunes:initialkey`), e.g. `Am`.
pub fn write_musical_key(bytes: &[u8], key: &str) -> Result<Vec<u8>> {
    write_freeform(bytes, MUSICAL_KEY.mean, MUSICAL_KEY.name, Data::Utf8(key.to_owned()))
}

/// Reads the musical key, if present.
pub fn read_musical_key(bytes: &[u8]) -> Result<Option<String>> {
    Ok(read_freeform(bytes, MUSICAL_KEY.mean, MUSICAL_KEY.name)?.and_then(Data::into_string))
}

/// Writes the title (`©nam`) atom.
pub fn write_title(bytes: &[u8], title: &str) -> Result<Vec<u8>> {
    write_itunes_text(bytes, TITLE, title)
}

/// Reads the title, if present.
pub fn read_title(bytes: &[u8]) -> Result<Option<String>> {
    read_itunes_text(bytes, TITLE)
}

/// Writes the artist (`©ART`) atom.
pub fn write_artist(bytes: &[u8], artist: &str) -> Result<Vec<u8>> {
    write_itunes_text(bytes, ARTIST, artist)
}

/// Reads the artist, if present.
pub fn read_artist(bytes: &[u8]) -> Result<Option<String>> {
    read_itunes_text(bytes, ARTIST)
}

/// Writes the album (`©alb`) atom.
pub fn write_album(bytes: &[u8], album: &str) -> Result<Vec<u8>> {
    write_itunes_text(bytes, ALBUM, album)
}

/// Reads the album, if present.
pub fn read_album(bytes: &[u8]) -> Result<Option<String>> {
    read_itunes_text(bytes, ALBUM)
}

/// Writes the year (`©day`) atom.
pub fn write_year(bytes: &[u8], year: &str) -> Result<Vec<u8>> {
    write_itunes_text(bytes, YEAR, year)
}

/// Reads the year, if present.
pub fn read_year(bytes: &[u8]) -> Result<Option<String>> {
    read_itunes_text(bytes, YEAR)
}

/// Writes the genre (`©gen`) atom.
pub fn write_genre(bytes: &[u8], genre: &str) -> Result<Vec<u8>> {
    write_itunes_text(bytes, CUSTOM_GENRE, genre)
}

/// Reads the genre, if present.
pub fn read_genre(bytes: &[u8]) -> Result<Option<String>> {
    read_itunes_text(bytes, CUSTOM_GENRE)
}

/// Sets or clears the enabled bit of a track's header flags.
///
/// Players that sum stems at playback time conventionally disable every
/// track but the mixdown so generic players only render the mix.
pub fn set_track_enabled(bytes: &[u8], index: usize, enabled: bool) -> Result<Vec<u8>> {
    edit::set_track_enabled(bytes, index, enabled)
}
