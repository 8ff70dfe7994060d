//! A metadata item can either have a plain fourcc as its identifier:
//! **** (any fourcc)
//! └─ data
//!
//! Or it can contain mean and name children atoms which make up the identifier.
//! ---- (freeform fourcc)
//! ├─ mean
//! ├─ name
//! └─ data
use super::*;

/// A struct representing a metadata item, containing data that is associated
/// with an identifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetaItem {
    /// The identifier of the atom.
    pub ident: DataIdent,
    /// The data contained in the atom.
    pub data: Data,
}

impl MetaItem {
    /// Creates a metadata item with the identifier and data.
    pub const fn new(ident: DataIdent, data: Data) -> Self {
        Self { ident, data }
    }

    /// Returns the external length of the atom in bytes.
    pub fn len(&self) -> u64 {
        let parent_len = 8;
        let data_len = self.data.len();

        match &self.ident {
            DataIdent::Fourcc(_) => parent_len + data_len,
            DataIdent::Freeform { mean, name } => {
                let mean_len = 12 + mean.len() as u64;
                let name_len = 12 + name.len() as u64;

                parent_len + mean_len + name_len + data_len
            }
        }
    }

    /// Attempts to parse a metadata item with the given head from the reader.
    ///
    /// The reader is expected to be positioned right after the head.
    pub fn parse(reader: &mut (impl Read + Seek), head: Head) -> crate::Result<Self> {
        let mut data = None;
        let mut mean: Option<String> = None;
        let mut name: Option<String> = None;
        let mut parsed_bytes = 0;
        let end = reader.stream_position()? + head.content_len();

        while parsed_bytes < head.content_len() {
            let child = parse_head(reader, end)?;

            match child.fourcc() {
                DATA => {
                    if data.is_none() {
                        data = Some(Data::parse(reader, child.size())?);
                    } else {
                        reader.skip(child.content_len() as i64)?;
                    }
                }
                MEAN | NAME => {
                    if child.content_len() < 4 {
                        return Err(crate::Error::new(
                            ErrorKind::Truncated,
                            format!(
                                "Atom {} is too short to hold its version and flags",
                                child.fourcc(),
                            ),
                        ));
                    }
                    let (version, _) = parse_full_head(reader)?;
                    if version != 0 {
                        return Err(crate::Error::new(
                            ErrorKind::UnknownVersion(version),
                            format!("Error reading {} atom", child.fourcc()),
                        ));
                    }
                    let string = reader.read_utf8(child.content_len() - 4)?;
                    match child.fourcc() {
                        MEAN => mean = Some(string),
                        _ => name = Some(string),
                    }
                }
                _ => reader.skip(child.content_len() as i64)?,
            }

            parsed_bytes += child.len();
        }

        let ident = match (head.fourcc(), mean, name) {
            (FREEFORM, Some(mean), Some(name)) => DataIdent::Freeform { mean, name },
            (fourcc, _, _) => DataIdent::Fourcc(fourcc),
        };

        match data {
            Some(data) => Ok(Self { ident, data }),
            None => Err(crate::Error::new(
                ErrorKind::AtomNotFound(DATA),
                format!("Missing data atom inside metadata item {ident}"),
            )),
        }
    }

    /// Attempts to write the metadata item to the writer.
    pub fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_be_u32(self.len() as u32)?;

        match &self.ident {
            DataIdent::Fourcc(ident) => writer.write_all(ident.deref())?,
            DataIdent::Freeform { mean, name } => {
                writer.write_all(&*FREEFORM)?;

                let mean_len = 12 + mean.len() as u32;
                writer.write_be_u32(mean_len)?;
                writer.write_all(&*MEAN)?;
                writer.write_all(&[0; 4])?;
                writer.write_utf8(mean)?;

                let name_len = 12 + name.len() as u32;
                writer.write_be_u32(name_len)?;
                writer.write_all(&*NAME)?;
                writer.write_all(&[0; 4])?;
                writer.write_utf8(name)?;
            }
        }

        self.data.write(writer)?;

        Ok(())
    }

    /// Returns the complete atom as a byte vector.
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len() as usize);
        self.write(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn freeform_layout() {
        let item = MetaItem::new(
            DataIdent::freeform("com.stems", "kons"),
            Data::Reserved(vec![1, 0, 0, 0, 0]),
        );
        let bytes = item.to_bytes().unwrap();
        assert_eq!(bytes.len() as u64, item.len());
        assert_eq!(&bytes[4..8], b"----");
        assert_eq!(&bytes[12..16], b"mean");
        assert_eq!(&bytes[20..29], b"com.stems");

        let mut reader = Cursor::new(&bytes[..]);
        let head = parse_head(&mut reader, bytes.len() as u64).unwrap();
        let parsed = MetaItem::parse(&mut reader, head).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn standard_layout() {
        let item = MetaItem::new(DataIdent::from(BPM), Data::BeSigned(vec![0x00, 0x78]));
        let bytes = item.to_bytes().unwrap();
        assert_eq!(&bytes[4..8], b"tmpo");
        // data atom: 8 head + 4 type + 4 locale + 2 payload
        assert_eq!(bytes.len(), 8 + 18);
        assert_eq!(bytes[8 + 11], 21); // type code
        assert_eq!(&bytes[bytes.len() - 2..], &[0x00, 0x78]);
    }
}
