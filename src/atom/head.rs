use super::*;

/// A struct storing the size of an atom and whether its head is extended.
///
/// 4 bytes standard length
/// 4 bytes identifier
/// 8 bytes optional extended length
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Size {
    /// Whether the head is of standard size (8 bytes) with a 32 bit length or
    /// extended (16 bytes) with a 64 bit length.
    ext: bool,
    /// The length including the head.
    len: u64,
}

impl Size {
    pub const fn from(content_len: u64) -> Self {
        let mut len = content_len + 8;
        let ext = len > u32::MAX as u64;
        if ext {
            len += 8;
        }
        Self { ext, len }
    }

    pub const fn ext(&self) -> bool {
        self.ext
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn head_len(&self) -> u64 {
        match self.ext {
            true => 16,
            false => 8,
        }
    }

    pub const fn content_len(&self) -> u64 {
        match self.ext {
            true => self.len - 16,
            false => self.len - 8,
        }
    }
}

/// A head specifying the size and type of an atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Head {
    size: Size,
    fourcc: Fourcc,
}

impl Deref for Head {
    type Target = Size;

    fn deref(&self) -> &Self::Target {
        &self.size
    }
}

impl Head {
    pub const fn new(ext: bool, len: u64, fourcc: Fourcc) -> Self {
        Self { size: Size { ext, len }, fourcc }
    }

    pub const fn from(size: Size, fourcc: Fourcc) -> Self {
        Self { size, fourcc }
    }

    pub const fn size(&self) -> Size {
        self.size
    }

    pub const fn fourcc(&self) -> Fourcc {
        self.fourcc
    }
}

/// Attempts to parse an atom head at the reader's position, bounded by the
/// enclosing window ending at `end`.
///
/// A 32 bit length of 1 denotes an extended head with a 64 bit length. A
/// length of 0 denotes an atom that extends to the end of the enclosing box;
/// such an atom is returned with its length resolved against `end`. Any other
/// length below 8 is invalid.
pub fn parse_head(reader: &mut (impl Read + Seek), end: u64) -> crate::Result<Head> {
    let pos = reader.stream_position()?;
    if pos + 8 > end {
        return Err(crate::Error::new(
            ErrorKind::Truncated,
            format!("Atom head at {pos} extends past the enclosing bound {end}"),
        ));
    }

    let len = reader.read_be_u32()? as u64;
    let mut fourcc = Fourcc([0; 4]);
    reader.read_exact(&mut *fourcc)?;

    let head = match len {
        0 => Head::new(false, end - pos, fourcc),
        1 => {
            if pos + 16 > end {
                return Err(crate::Error::new(
                    ErrorKind::Truncated,
                    format!("Extended atom head at {pos} extends past the enclosing bound {end}"),
                ));
            }
            let large = reader.read_be_u64()?;
            if large < 16 {
                return Err(crate::Error::new(
                    ErrorKind::InvalidSize(large),
                    format!("Read extended length of '{fourcc}' which is less than 16 bytes"),
                ));
            }
            Head::new(true, large, fourcc)
        }
        l if l < 8 => {
            return Err(crate::Error::new(
                ErrorKind::InvalidSize(l),
                format!("Read length of '{fourcc}' which is less than 8 bytes"),
            ));
        }
        l => Head::new(false, l, fourcc),
    };

    if pos + head.len() > end {
        return Err(crate::Error::new(
            ErrorKind::Truncated,
            format!(
                "Atom '{}' at {} with length {} extends past the enclosing bound {}",
                fourcc,
                pos,
                head.len(),
                end,
            ),
        ));
    }

    Ok(head)
}

pub fn write_head(writer: &mut impl Write, head: Head) -> crate::Result<()> {
    if head.ext() {
        writer.write_be_u32(1)?;
        writer.write_all(&*head.fourcc())?;
        writer.write_be_u64(head.len())?;
    } else {
        writer.write_be_u32(head.len() as u32)?;
        writer.write_all(&*head.fourcc())?;
    }
    Ok(())
}

/// Attempts to parse a full atom head.
///
/// 1 byte version
/// 3 bytes flags
pub fn parse_full_head(reader: &mut impl Read) -> crate::Result<(u8, [u8; 3])> {
    let version = reader.read_u8()?;
    let mut flags = [0; 3];
    reader.read_exact(&mut flags)?;

    Ok((version, flags))
}

pub fn write_full_head(writer: &mut impl Write, version: u8, flags: [u8; 3]) -> crate::Result<()> {
    writer.write_all(&[version])?;
    writer.write_all(&flags)?;
    Ok(())
}

/// A struct storing the position and size of an atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AtomBounds {
    pos: u64,
    head: Head,
}

impl Deref for AtomBounds {
    type Target = Head;

    fn deref(&self) -> &Self::Target {
        &self.head
    }
}

impl AtomBounds {
    pub const fn new(pos: u64, head: Head) -> Self {
        Self { pos, head }
    }

    pub const fn pos(&self) -> u64 {
        self.pos
    }

    pub fn content_pos(&self) -> u64 {
        self.pos + self.head_len()
    }

    pub fn end(&self) -> u64 {
        self.pos + self.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn short_head() {
        let bytes = [0x00, 0x00, 0x00, 0x10, b'm', b'o', b'o', b'v', 0, 0, 0, 0, 0, 0, 0, 0];
        let head = parse_head(&mut Cursor::new(&bytes[..]), 16).unwrap();
        assert_eq!(head.fourcc(), MOVIE);
        assert_eq!(head.len(), 16);
        assert_eq!(head.head_len(), 8);
    }

    #[test]
    fn extended_head() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x01, b'm', b'd', b'a', b't'];
        bytes.extend_from_slice(&24u64.to_be_bytes());
        bytes.extend_from_slice(&[0; 8]);
        let head = parse_head(&mut Cursor::new(&bytes[..]), 24).unwrap();
        assert_eq!(head.fourcc(), MEDIA_DATA);
        assert_eq!(head.len(), 24);
        assert_eq!(head.content_len(), 8);
    }

    #[test]
    fn zero_length_extends_to_end() {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x00, b'm', b'd', b'a', b't'];
        bytes.extend_from_slice(&[0xab; 12]);
        let head = parse_head(&mut Cursor::new(&bytes[..]), 20).unwrap();
        assert_eq!(head.len(), 20);
    }

    #[test]
    fn invalid_length() {
        let bytes = [0x00, 0x00, 0x00, 0x05, b'f', b'r', b'e', b'e'];
        let err = parse_head(&mut Cursor::new(&bytes[..]), 8).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidSize(5)));
    }

    #[test]
    fn truncated() {
        let bytes = [0x00, 0x00, 0x01, 0x00, b'm', b'o', b'o', b'v'];
        let err = parse_head(&mut Cursor::new(&bytes[..]), 8).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Truncated));
    }
}
