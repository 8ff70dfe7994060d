use super::*;

/// The version, flags and entry count words preceding the offset table.
pub(crate) const HEADER_SIZE: u64 = 8;

/// A struct representing a sample table chunk offset atom (`stco`).
///
/// The offsets index into the entire file, not into any atom.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stco {
    pub offsets: Vec<u32>,
}

impl Atom for Stco {
    const FOURCC: Fourcc = SAMPLE_TABLE_CHUNK_OFFSET;
}

impl ParseAtom for Stco {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let (version, _) = parse_full_head(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown sample table chunk offset (stco) version",
            ));
        }

        let entries = reader.read_be_u32()?;
        if HEADER_SIZE + 4 * entries as u64 != size.content_len() {
            return Err(crate::Error::new(
                ErrorKind::InvalidContainer,
                "Sample table chunk offset (stco) table size doesn't match atom length",
            ));
        }

        let mut offsets = Vec::with_capacity(entries as usize);
        for _ in 0..entries {
            offsets.push(reader.read_be_u32()?);
        }

        Ok(Self { offsets })
    }
}

impl WriteAtom for Stco {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        write_full_head(writer, 0, [0; 3])?;

        writer.write_be_u32(self.offsets.len() as u32)?;
        for o in self.offsets.iter() {
            writer.write_be_u32(*o)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = HEADER_SIZE + 4 * self.offsets.len() as u64;
        Size::from(content_len)
    }
}
