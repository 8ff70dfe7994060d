use super::*;

/// A struct representing a sample description atom (`stsd`).
///
/// The content is carried as raw bytes: it embeds the codec specific decoder
/// configuration (e.g. the `esds` of an `mp4a` entry), and reusing it
/// unchanged is the only way to preserve that configuration without
/// re-encoding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsd {
    pub data: Vec<u8>,
}

impl Deref for Stsd {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl Atom for Stsd {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_DESCRIPTION;
}

impl ParseAtom for Stsd {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        Ok(Self { data: reader.read_u8_vec(size.content_len())? })
    }
}

impl WriteAtom for Stsd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        writer.write_all(self)?;
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(self.data.len() as u64)
    }
}
