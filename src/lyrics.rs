//! The timed lyrics document stored in the `----:com.stems:kara` atom.
//!
//! The document is a JSON object; readers tolerate unknown fields so the
//! format can grow without breaking older consumers.

use serde::{Deserialize, Serialize};

/// A timed lyrics document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lyrics {
    /// Properties of the audio the timings refer to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioProperties>,
    /// Global timing adjustments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    /// The lyric lines in display order.
    pub lines: Vec<Line>,
    /// The singers referenced by the lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub singers: Vec<Singer>,
}

impl Lyrics {
    /// Parses a lyrics document from its JSON encoding.
    pub fn from_json(json: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Returns the document's JSON encoding.
    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Properties of the audio rendition the lyric timings were aligned against.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioProperties {
    /// The encoding profile name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// The number of priming samples the encoder inserts before the first
    /// audible sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder_delay_samples: Option<u32>,
    /// The source recordings the mix was built from.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// The processing presets applied during mastering.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<String>,
}

/// Global timing adjustments applied to every line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// The offset added to every timestamp, in seconds.
    pub offset_sec: f64,
}

/// One lyric line with its display interval.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    /// The start of the line in seconds.
    pub start: f64,
    /// The end of the line in seconds.
    pub end: f64,
    /// The display text.
    pub text: String,
    /// Per-word timings, if the line is word-aligned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
    /// The id of the singer performing the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singer: Option<String>,
}

/// One word of a word-aligned line.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Word {
    /// The start of the word in seconds.
    pub start: f64,
    /// The end of the word in seconds.
    pub end: f64,
    /// The word text.
    pub text: String,
}

/// A singer referenced by lyric lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Singer {
    /// The id lines refer to.
    pub id: String,
    /// The display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
