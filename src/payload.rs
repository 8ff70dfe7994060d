//! Binary payload codecs for the freeform karaoke atoms, and the payload
//! builders for the standard iTunes integer atoms.

use crate::atom::Data;
use crate::ErrorKind;

/// The current version byte of the vocal pitch payload.
const PITCH_VERSION: u8 = 1;
/// The current version byte of the onset payload.
const ONSET_VERSION: u8 = 1;

/// The largest cents deviation a pitch point can carry.
const MAX_CENTS: i8 = 50;

/// One sampled point of the vocal pitch curve.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PitchPoint {
    /// The MIDI note number, 0 to 127.
    pub note: u8,
    /// The deviation from the note in cents, -50 to +50.
    pub cents: i8,
}

/// A uniformly sampled vocal pitch curve.
///
/// Binary layout: `version(u8) sample_rate_hz(u32) count(u32)` followed by
/// `count` pairs of `(note u8, cents i8)`, all integers big-endian.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PitchCurve {
    /// The rate at which the curve is sampled, in points per second.
    pub sample_rate_hz: u32,
    /// The sampled points.
    pub points: Vec<PitchPoint>,
}

impl PitchCurve {
    /// Encodes the curve, clipping notes to the MIDI range and cents to
    /// [-50, +50].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9 + 2 * self.points.len());
        buf.push(PITCH_VERSION);
        buf.extend_from_slice(&self.sample_rate_hz.to_be_bytes());
        buf.extend_from_slice(&(self.points.len() as u32).to_be_bytes());
        for p in self.points.iter() {
            buf.push(p.note.min(127));
            buf.push(p.cents.clamp(-MAX_CENTS, MAX_CENTS) as u8);
        }
        buf
    }

    /// Decodes and validates a pitch curve payload.
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.len() < 9 {
            return Err(crate::Error::new(
                ErrorKind::MalformedPayload,
                "Pitch curve payload is shorter than its header",
            ));
        }
        if bytes[0] != PITCH_VERSION {
            return Err(crate::Error::new(
                ErrorKind::MalformedPayload,
                format!("Unknown pitch curve payload version {}", bytes[0]),
            ));
        }

        let sample_rate_hz = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let count = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;
        if bytes.len() != 9 + 2 * count {
            return Err(crate::Error::new(
                ErrorKind::MalformedPayload,
                format!(
                    "Pitch curve payload length {} doesn't match its count of {count} points",
                    bytes.len(),
                ),
            ));
        }

        let mut points = Vec::with_capacity(count);
        for pair in bytes[9..].chunks_exact(2) {
            let note = pair[0];
            let cents = pair[1] as i8;
            if note > 127 || cents < -MAX_CENTS || cents > MAX_CENTS {
                return Err(crate::Error::new(
                    ErrorKind::MalformedPayload,
                    format!("Pitch point ({note}, {cents}) is out of range"),
                ));
            }
            points.push(PitchPoint { note, cents });
        }

        Ok(Self { sample_rate_hz, points })
    }
}

/// A list of onset timestamps in milliseconds.
///
/// Binary layout: `version(u8) count(u32)` followed by `count` big-endian
/// `u32` millisecond timestamps.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Onsets {
    /// The onset times in milliseconds.
    pub times_ms: Vec<u32>,
}

impl Onsets {
    /// Builds an onset list from timestamps in seconds, rounding to the
    /// nearest millisecond.
    pub fn from_seconds(times_sec: &[f64]) -> Self {
        let times_ms = times_sec
            .iter()
            .map(|s| (s * 1000.0).round().clamp(0.0, u32::MAX as f64) as u32)
            .collect();
        Self { times_ms }
    }

    /// The onset times in seconds.
    pub fn seconds(&self) -> Vec<f64> {
        self.times_ms.iter().map(|ms| *ms as f64 / 1000.0).collect()
    }

    /// Encodes the onset list.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(5 + 4 * self.times_ms.len());
        buf.push(ONSET_VERSION);
        buf.extend_from_slice(&(self.times_ms.len() as u32).to_be_bytes());
        for t in self.times_ms.iter() {
            buf.extend_from_slice(&t.to_be_bytes());
        }
        buf
    }

    /// Decodes and validates an onset payload.
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.len() < 5 {
            return Err(crate::Error::new(
                ErrorKind::MalformedPayload,
                "Onset payload is shorter than its header",
            ));
        }
        if bytes[0] != ONSET_VERSION {
            return Err(crate::Error::new(
                ErrorKind::MalformedPayload,
                format!("Unknown onset payload version {}", bytes[0]),
            ));
        }

        let count = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
        if bytes.len() != 5 + 4 * count {
            return Err(crate::Error::new(
                ErrorKind::MalformedPayload,
                format!(
                    "Onset payload length {} doesn't match its count of {count} timestamps",
                    bytes.len(),
                ),
            ));
        }

        let times_ms = bytes[5..]
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self { times_ms })
    }
}

/// The `tmpo` payload: a big-endian u16 of type code 21.
pub(crate) fn tempo_data(bpm: u16) -> Data {
    Data::BeSigned(bpm.to_be_bytes().to_vec())
}

/// The `trkn` payload: `(reserved u16, number u16, total u16, reserved u16)`
/// of type code 0.
pub(crate) fn track_number_data(number: u16, total: u16) -> Data {
    let mut buf = Vec::with_capacity(8);
    buf.extend_from_slice(&[0; 2]);
    buf.extend_from_slice(&number.to_be_bytes());
    buf.extend_from_slice(&total.to_be_bytes());
    buf.extend_from_slice(&[0; 2]);
    Data::Reserved(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pitch_round_trip() {
        let curve = PitchCurve {
            sample_rate_hz: 50,
            points: vec![
                PitchPoint { note: 57, cents: -12 },
                PitchPoint { note: 64, cents: 50 },
            ],
        };
        let bytes = curve.to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes.len(), 9 + 4);
        assert_eq!(PitchCurve::from_bytes(&bytes).unwrap(), curve);
    }

    #[test]
    fn pitch_clipping() {
        let curve =
            PitchCurve { sample_rate_hz: 50, points: vec![PitchPoint { note: 200, cents: -90 }] };
        let decoded = PitchCurve::from_bytes(&curve.to_bytes()).unwrap();
        assert_eq!(decoded.points[0], PitchPoint { note: 127, cents: -50 });
    }

    #[test]
    fn pitch_rejects_bad_version() {
        let mut bytes = PitchCurve::default().to_bytes();
        bytes[0] = 2;
        let err = PitchCurve::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedPayload));
    }

    #[test]
    fn pitch_rejects_length_mismatch() {
        let mut bytes = PitchCurve::default().to_bytes();
        bytes.push(0);
        let err = PitchCurve::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedPayload));
    }

    #[test]
    fn onset_rounding() {
        let onsets = Onsets::from_seconds(&[0.0, 0.5004, 12.3456]);
        assert_eq!(onsets.times_ms, vec![0, 500, 12_346]);

        let bytes = onsets.to_bytes();
        assert_eq!(Onsets::from_bytes(&bytes).unwrap(), onsets);
    }

    #[test]
    fn tempo_payload() {
        let data = tempo_data(120);
        assert_eq!(data.type_code(), 21);
        assert_eq!(data.bytes(), &[0x00, 0x78]);
    }

    #[test]
    fn track_number_payload() {
        let data = track_number_data(3, 12);
        assert_eq!(data.type_code(), 0);
        assert_eq!(data.bytes(), &[0, 0, 0, 3, 0, 12, 0, 0]);
    }
}
