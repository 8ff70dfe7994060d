use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsz {
    /// The uniform sample size, or 0 if the samples have individual sizes.
    pub sample_size: u32,
    pub sample_count: u32,
    /// The individual sample sizes, empty if `sample_size` is nonzero.
    pub sizes: Vec<u32>,
}

impl Atom for Stsz {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_SIZE;
}

impl ParseAtom for Stsz {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let (version, _) = parse_full_head(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown sample table sample size (stsz) version",
            ));
        }

        let sample_size = reader.read_be_u32()?;
        let sample_count = reader.read_be_u32()?;

        let sizes = if sample_size == 0 {
            let table_size = 12 + 4 * sample_count as u64;
            if table_size != size.content_len() {
                return Err(crate::Error::new(
                    ErrorKind::InvalidContainer,
                    format!(
                        "Sample table sample size (stsz) table size {} doesn't match atom content length {}",
                        table_size,
                        size.content_len(),
                    ),
                ));
            }

            let mut sizes = Vec::with_capacity(sample_count as usize);
            for _ in 0..sample_count {
                sizes.push(reader.read_be_u32()?);
            }
            sizes
        } else {
            if size.content_len() != 12 {
                return Err(crate::Error::new(
                    ErrorKind::InvalidContainer,
                    format!(
                        "Sample table sample size (stsz) uniform sample size set, but content length {} doesn't match",
                        size.content_len(),
                    ),
                ));
            }

            Vec::new()
        };

        Ok(Self { sample_size, sample_count, sizes })
    }
}

impl WriteAtom for Stsz {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        write_full_head(writer, 0, [0; 3])?;

        writer.write_be_u32(self.sample_size)?;
        writer.write_be_u32(self.sample_count)?;
        for s in self.sizes.iter() {
            writer.write_be_u32(*s)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 12 + 4 * self.sizes.len() as u64;
        Size::from(content_len)
    }
}

impl Stsz {
    /// Returns the size of the 0-based sample `i`.
    pub fn size_of(&self, i: usize) -> u32 {
        if self.sample_size != 0 {
            self.sample_size
        } else {
            self.sizes.get(i).copied().unwrap_or(0)
        }
    }

    /// The summed size of all samples in bytes.
    pub fn total_size(&self) -> u64 {
        if self.sample_size != 0 {
            self.sample_size as u64 * self.sample_count as u64
        } else {
            self.sizes.iter().map(|s| *s as u64).sum()
        }
    }
}
