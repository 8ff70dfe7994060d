use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsc {
    pub items: Vec<StscItem>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StscItem {
    /// The 1-based index of the first chunk the entry applies to.
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_id: u32,
}

impl Atom for Stsc {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_TO_CHUNK;
}

impl ParseAtom for Stsc {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let (version, _) = parse_full_head(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown sample table sample to chunk (stsc) version",
            ));
        }

        let entries = reader.read_be_u32()?;
        if 8 + 12 * entries as u64 != size.content_len() {
            return Err(crate::Error::new(
                ErrorKind::InvalidContainer,
                "Sample table sample to chunk (stsc) table size doesn't match atom length",
            ));
        }

        let mut items: Vec<StscItem> = Vec::with_capacity(entries as usize);
        for _ in 0..entries {
            let item = StscItem {
                first_chunk: reader.read_be_u32()?,
                samples_per_chunk: reader.read_be_u32()?,
                sample_description_id: reader.read_be_u32()?,
            };

            let valid = match items.last() {
                Some(prev) => item.first_chunk > prev.first_chunk,
                None => item.first_chunk >= 1,
            };
            if !valid {
                return Err(crate::Error::new(
                    ErrorKind::InvalidContainer,
                    "Sample table sample to chunk (stsc) first chunk column isn't strictly increasing",
                ));
            }

            items.push(item);
        }

        Ok(Self { items })
    }
}

impl WriteAtom for Stsc {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        write_full_head(writer, 0, [0; 3])?;

        writer.write_be_u32(self.items.len() as u32)?;
        for i in self.items.iter() {
            writer.write_be_u32(i.first_chunk)?;
            writer.write_be_u32(i.samples_per_chunk)?;
            writer.write_be_u32(i.sample_description_id)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 8 + 12 * self.items.len() as u64;
        Size::from(content_len)
    }
}

impl Stsc {
    /// Returns the number of samples in the 1-based chunk `k`: the value of
    /// the entry with the largest `first_chunk` that is at most `k`.
    pub fn samples_per_chunk(&self, k: u32) -> u32 {
        self.items
            .iter()
            .take_while(|i| i.first_chunk <= k)
            .last()
            .map_or(0, |i| i.samples_per_chunk)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chunk_lookup() {
        let stsc = Stsc {
            items: vec![
                StscItem { first_chunk: 1, samples_per_chunk: 60, sample_description_id: 1 },
                StscItem { first_chunk: 3, samples_per_chunk: 20, sample_description_id: 1 },
            ],
        };
        assert_eq!(stsc.samples_per_chunk(1), 60);
        assert_eq!(stsc.samples_per_chunk(2), 60);
        assert_eq!(stsc.samples_per_chunk(3), 20);
        assert_eq!(stsc.samples_per_chunk(9), 20);
    }
}
