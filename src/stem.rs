//! The stems manifest stored as raw JSON in the `moov/udta/stem` atom.
//!
//! The manifest names the stem tracks in order (the mixdown track is not
//! listed, it is always the first track of the file) and carries the
//! mastering DSP settings a player applies when summing stems instead of
//! playing the pre-rendered mixdown.

use serde::{Deserialize, Serialize};

fn default_version() -> u32 {
    1
}

/// The stems manifest document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StemManifest {
    /// The manifest format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// The mastering chain applied to the summed stems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mastering_dsp: Option<MasteringDsp>,
    /// The stem tracks in file order.
    pub stems: Vec<StemEntry>,
}

impl Default for StemManifest {
    fn default() -> Self {
        Self { version: default_version(), mastering_dsp: None, stems: Vec::new() }
    }
}

impl StemManifest {
    /// The conventional four-stem layout with its usual display colors.
    pub fn four_stem() -> Self {
        let stems = [
            ("Drums", "#009e73"),
            ("Bass", "#d55e00"),
            ("Other", "#cc79a7"),
            ("Vocals", "#56b4e9"),
        ]
        .into_iter()
        .map(|(name, color)| StemEntry { name: name.to_owned(), color: color.to_owned() })
        .collect();

        Self { stems, ..Default::default() }
    }

    /// Parses a manifest from its JSON encoding.
    pub fn from_json(json: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Returns the manifest's JSON encoding.
    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// One stem track entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemEntry {
    /// The display name, e.g. `Drums`.
    pub name: String,
    /// The display color as a `#rrggbb` string.
    pub color: String,
}

/// The mastering chain applied when stems are summed at playback time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteringDsp {
    /// The compressor stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressor: Option<Compressor>,
    /// The limiter stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limiter: Option<Limiter>,
}

/// Compressor settings of the mastering chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Compressor {
    /// Whether the stage is active.
    pub enabled: bool,
    /// The compression ratio.
    pub ratio: f64,
    /// The input gain in dB.
    pub input_gain: f64,
    /// The output gain in dB.
    pub output_gain: f64,
    /// The attack time in seconds.
    pub attack: f64,
    /// The release time in seconds.
    pub release: f64,
    /// The threshold in dB.
    pub threshold: f64,
    /// The high-pass cutoff of the sidechain in Hz.
    pub hp_cutoff: f64,
    /// The dry/wet mix, 0 to 1.
    pub dry_wet: f64,
}

/// Limiter settings of the mastering chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limiter {
    /// Whether the stage is active.
    pub enabled: bool,
    /// The release time in seconds.
    pub release: f64,
    /// The threshold in dB.
    pub threshold: f64,
    /// The output ceiling in dB.
    pub ceiling: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let manifest = StemManifest {
            mastering_dsp: Some(MasteringDsp {
                compressor: Some(Compressor {
                    enabled: true,
                    ratio: 4.0,
                    threshold: -12.0,
                    ..Default::default()
                }),
                limiter: None,
            }),
            ..StemManifest::four_stem()
        };

        let json = manifest.to_json().unwrap();
        assert_eq!(StemManifest::from_json(&json).unwrap(), manifest);
    }

    #[test]
    fn version_defaults_to_one() {
        let manifest =
            StemManifest::from_json(br##"{"stems": [{"name": "Vocals", "color": "#56b4e9"}]}"##)
                .unwrap();
        assert_eq!(manifest.version, 1);
        assert_eq!(manifest.stems.len(), 1);
    }
}
