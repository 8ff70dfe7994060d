use std::array::TryFromSliceError;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// (`ftyp`) Identifier of the atom carrying information about the filetype.
pub const FILETYPE: Fourcc = Fourcc(*b"ftyp");
/// (`mdat`) Identifier of an atom carrying media data.
pub const MEDIA_DATA: Fourcc = Fourcc(*b"mdat");
/// (`moov`) Identifier of the atom containing a structure of children storing metadata.
pub const MOVIE: Fourcc = Fourcc(*b"moov");
/// (`mvhd`) Identifier of the atom containing information about the whole movie.
pub const MOVIE_HEADER: Fourcc = Fourcc(*b"mvhd");
/// (`trak`) Identifier of an atom containing information about a single track.
pub const TRACK: Fourcc = Fourcc(*b"trak");
/// (`tkhd`)
pub const TRACK_HEADER: Fourcc = Fourcc(*b"tkhd");
/// (`edts`)
pub const EDITS: Fourcc = Fourcc(*b"edts");
/// (`mdia`) Identifier of an atom containing information about a track's media type and data.
pub const MEDIA: Fourcc = Fourcc(*b"mdia");
/// (`mdhd`)
pub const MEDIA_HEADER: Fourcc = Fourcc(*b"mdhd");
/// (`minf`)
pub const MEDIA_INFORMATION: Fourcc = Fourcc(*b"minf");
/// (`smhd`)
pub const SOUND_MEDIA_HEADER: Fourcc = Fourcc(*b"smhd");
/// (`dinf`)
pub const DATA_INFORMATION: Fourcc = Fourcc(*b"dinf");
/// (`dref`)
pub const DATA_REFERENCE: Fourcc = Fourcc(*b"dref");
/// (`url `)
pub const URL_MEDIA: Fourcc = Fourcc(*b"url ");
/// (`stbl`)
pub const SAMPLE_TABLE: Fourcc = Fourcc(*b"stbl");
/// (`stsd`)
pub const SAMPLE_TABLE_SAMPLE_DESCRIPTION: Fourcc = Fourcc(*b"stsd");
/// (`stts`)
pub const SAMPLE_TABLE_TIME_TO_SAMPLE: Fourcc = Fourcc(*b"stts");
/// (`stsc`)
pub const SAMPLE_TABLE_SAMPLE_TO_CHUNK: Fourcc = Fourcc(*b"stsc");
/// (`stsz`)
pub const SAMPLE_TABLE_SAMPLE_SIZE: Fourcc = Fourcc(*b"stsz");
/// (`stco`)
pub const SAMPLE_TABLE_CHUNK_OFFSET: Fourcc = Fourcc(*b"stco");
/// (`co64`)
pub const SAMPLE_TABLE_CHUNK_OFFSET_64: Fourcc = Fourcc(*b"co64");
/// (`udta`) Identifier of the atom containing user metadata.
pub const USER_DATA: Fourcc = Fourcc(*b"udta");
/// (`meta`) Identifier of the atom containing a metadata item list.
pub const METADATA: Fourcc = Fourcc(*b"meta");
/// (`hdlr`) Identifier of the atom specifying the handler component that
/// should interpret the media's data.
pub const HANDLER_REFERENCE: Fourcc = Fourcc(*b"hdlr");
/// (`ilst`) Identifier of the atom containing a list of metadata atoms.
pub const ITEM_LIST: Fourcc = Fourcc(*b"ilst");
/// (`data`) Identifier of an atom containing typed data.
pub const DATA: Fourcc = Fourcc(*b"data");
/// (`mean`)
pub const MEAN: Fourcc = Fourcc(*b"mean");
/// (`name`)
pub const NAME: Fourcc = Fourcc(*b"name");
/// (`free`)
pub const FREE: Fourcc = Fourcc(*b"free");
/// (`stem`) Identifier of the atom carrying the raw JSON stems manifest as a
/// direct child of `udta`.
pub const STEM_MANIFEST: Fourcc = Fourcc(*b"stem");

/// (`----`)
pub const FREEFORM: Fourcc = Fourcc(*b"----");

// iTunes style atoms
/// (`©alb`)
pub const ALBUM: Fourcc = Fourcc(*b"\xa9alb");
/// (`©ART`)
pub const ARTIST: Fourcc = Fourcc(*b"\xa9ART");
/// (`tmpo`)
pub const BPM: Fourcc = Fourcc(*b"tmpo");
/// (`©gen`)
pub const CUSTOM_GENRE: Fourcc = Fourcc(*b"\xa9gen");
/// (`©nam`)
pub const TITLE: Fourcc = Fourcc(*b"\xa9nam");
/// (`trkn`)
pub const TRACK_NUMBER: Fourcc = Fourcc(*b"trkn");
/// (`©day`)
pub const YEAR: Fourcc = Fourcc(*b"\xa9day");

/// Mean string of Apple's freeform identifiers (`com.apple.iTunes`).
pub const APPLE_ITUNES_MEAN: &str = "com.apple.iTunes";
/// Mean string of the stems karaoke freeform identifiers (`com.stems`).
pub const STEMS_MEAN: &str = "com.stems";

/// (`----:com.stems:kara`) The timed lyrics JSON document.
pub const LYRICS: FreeformIdent = FreeformIdent::new(STEMS_MEAN, "kara");
/// (`----:com.stems:vpch`) The binary vocal pitch curve.
pub const VOCAL_PITCH: FreeformIdent = FreeformIdent::new(STEMS_MEAN, "vpch");
/// (`----:com.stems:kons`) The binary onset timestamp list.
pub const ONSETS: FreeformIdent = FreeformIdent::new(STEMS_MEAN, "kons");
/// (`----:com.apple.iTunes:initialkey`) The musical key, e.g. `Am`.
pub const MUSICAL_KEY: FreeformIdent = FreeformIdent::new(APPLE_ITUNES_MEAN, "initialkey");

/// A 4 byte atom identifier (four character code).
///
/// The bytes are interpreted as ISO-Latin-1; iTunes identifiers use the byte
/// 0xA9 (`©`) which is not valid utf-8.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Fourcc(pub [u8; 4]);

impl Deref for Fourcc {
    type Target = [u8; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Fourcc {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromStr for Fourcc {
    type Err = TryFromSliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Fourcc(s.as_bytes().try_into()?))
    }
}

impl fmt::Debug for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fourcc({})", self.0.iter().map(|b| char::from(*b)).collect::<String>())
    }
}

impl fmt::Display for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().map(|b| char::from(*b)).collect::<String>())
    }
}

/// An identifier of a freeform (`----`) atom containing borrowed mean and name
/// strings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FreeformIdent<'a> {
    /// The mean string, typically in reverse domain notation.
    pub mean: &'a str,
    /// The name string used to identify the freeform atom.
    pub name: &'a str,
}

impl fmt::Display for FreeformIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "----:{}:{}", self.mean, self.name)
    }
}

impl<'a> FreeformIdent<'a> {
    /// Creates a new freeform ident containing the mean and name as borrowed strings.
    pub const fn new(mean: &'a str, name: &'a str) -> Self {
        Self { mean, name }
    }
}

/// An identifier of a metadata item.
///
/// Standard items are identified by their fourcc alone, freeform (`----`)
/// items by the `(mean, name)` pair carried in their child atoms.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataIdent {
    /// A standard identifier containing a 4 byte atom identifier.
    Fourcc(Fourcc),
    /// An identifier of a freeform (`----`) atom containing owned mean and name strings.
    Freeform {
        /// The mean string, typically in reverse domain notation.
        mean: String,
        /// The name string used to identify the freeform atom.
        name: String,
    },
}

impl fmt::Display for DataIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fourcc(ident) => write!(f, "{ident}"),
            Self::Freeform { mean, name } => write!(f, "----:{mean}:{name}"),
        }
    }
}

impl From<Fourcc> for DataIdent {
    fn from(value: Fourcc) -> Self {
        Self::Fourcc(value)
    }
}

impl From<FreeformIdent<'_>> for DataIdent {
    fn from(value: FreeformIdent<'_>) -> Self {
        Self::freeform(value.mean, value.name)
    }
}

impl DataIdent {
    /// Creates a new identifier of type [`DataIdent::Freeform`] containing the
    /// owned mean and name string.
    pub fn freeform(mean: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Freeform { mean: mean.into(), name: name.into() }
    }
}
