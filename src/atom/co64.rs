use super::*;

/// A struct representing a 64 bit sample table chunk offset atom (`co64`).
///
/// Parse-only: synthesized single-track files always fit a 32 bit offset
/// table, so only `stco` is ever written.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Co64 {
    pub offsets: Vec<u64>,
}

impl Atom for Co64 {
    const FOURCC: Fourcc = SAMPLE_TABLE_CHUNK_OFFSET_64;
}

impl ParseAtom for Co64 {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let (version, _) = parse_full_head(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown 64 bit sample table chunk offset (co64) version",
            ));
        }

        let entries = reader.read_be_u32()?;
        if stco::HEADER_SIZE + 8 * entries as u64 != size.content_len() {
            return Err(crate::Error::new(
                ErrorKind::InvalidContainer,
                "64 bit sample table chunk offset (co64) table size doesn't match atom length",
            ));
        }

        let mut offsets = Vec::with_capacity(entries as usize);
        for _ in 0..entries {
            offsets.push(reader.read_be_u64()?);
        }

        Ok(Self { offsets })
    }
}
