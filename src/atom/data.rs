use std::fmt;

use super::*;

/// The length of the type indicator and locale words preceding the payload.
pub(crate) const HEADER_SIZE: u64 = 8;

// Well-known data type codes.
/// Reserved for use where no type needs to be indicated, used for track
/// numbers and other binary payloads.
const RESERVED: u32 = 0;
/// UTF-8 without any count or NULL terminator.
const UTF8: u32 = 1;
/// A big-endian signed integer in 1, 2, 3 or 4 bytes.
const BE_SIGNED: u32 = 21;

/// The typed payload of a metadata `data` atom.
#[derive(Clone, Eq, PartialEq)]
pub enum Data {
    /// Data of an unspecified type, used for binary payloads (type code 0).
    Reserved(Vec<u8>),
    /// A utf-8 encoded string (type code 1).
    Utf8(String),
    /// A big-endian signed integer (type code 21).
    BeSigned(Vec<u8>),
    /// A value containing an unknown data type code and its raw data.
    Unknown {
        /// The data type code.
        code: u32,
        /// The data.
        data: Vec<u8>,
    },
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved(d) => write!(f, "Data::Reserved({d:?})"),
            Self::Utf8(d) => write!(f, "Data::Utf8({d:?})"),
            Self::BeSigned(d) => write!(f, "Data::BeSigned({d:?})"),
            Self::Unknown { code, data } => {
                f.debug_struct("Data::Unknown").field("code", code).field("data", data).finish()
            }
        }
    }
}

impl Atom for Data {
    const FOURCC: Fourcc = DATA;
}

impl ParseAtom for Data {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        if size.content_len() < HEADER_SIZE {
            return Err(crate::Error::new(
                ErrorKind::Truncated,
                "Data atom (data) is too short to hold its type indicator and locale",
            ));
        }

        let (version, [b2, b1, b0]) = parse_full_head(reader)?;
        if version != 0 {
            return Err(crate::Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown data atom (data) version",
            ));
        }
        let datatype = u32::from_be_bytes([0, b2, b1, b0]);

        reader.skip(4)?; // locale indicator

        let len = size.content_len() - HEADER_SIZE;
        Ok(match datatype {
            RESERVED => Self::Reserved(reader.read_u8_vec(len)?),
            UTF8 => Self::Utf8(reader.read_utf8(len)?),
            BE_SIGNED => Self::BeSigned(reader.read_u8_vec(len)?),
            _ => Self::Unknown { code: datatype, data: reader.read_u8_vec(len)? },
        })
    }
}

impl WriteAtom for Data {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        writer.write_be_u32(self.type_code())?;
        writer.write_all(&[0; 4])?; // locale indicator
        match self {
            Self::Reserved(v) => writer.write_all(v)?,
            Self::Utf8(s) => writer.write_utf8(s)?,
            Self::BeSigned(v) => writer.write_all(v)?,
            Self::Unknown { data, .. } => writer.write_all(data)?,
        }
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(HEADER_SIZE + self.data_len())
    }
}

impl Data {
    /// Returns the data type code written to the data atom's type indicator.
    pub fn type_code(&self) -> u32 {
        match self {
            Self::Reserved(_) => RESERVED,
            Self::Utf8(_) => UTF8,
            Self::BeSigned(_) => BE_SIGNED,
            Self::Unknown { code, .. } => *code,
        }
    }

    /// Returns the length of the raw payload in bytes, without the type
    /// indicator and locale words.
    pub fn data_len(&self) -> u64 {
        (match self {
            Self::Reserved(v) => v.len(),
            Self::Utf8(s) => s.len(),
            Self::BeSigned(v) => v.len(),
            Self::Unknown { data, .. } => data.len(),
        }) as u64
    }

    /// Returns a string reference if the data is of type [`Utf8`].
    ///
    /// [`Utf8`]: Data::Utf8
    pub fn string(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the owned string if the data is of type [`Utf8`].
    ///
    /// [`Utf8`]: Data::Utf8
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Reserved(v) => v,
            Self::Utf8(s) => s.as_bytes(),
            Self::BeSigned(v) => v,
            Self::Unknown { data, .. } => data,
        }
    }

    /// Returns the owned raw payload bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Reserved(v) => v,
            Self::Utf8(s) => s.into_bytes(),
            Self::BeSigned(v) => v,
            Self::Unknown { data, .. } => data,
        }
    }
}
