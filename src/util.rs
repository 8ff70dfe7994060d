use std::io::{self, Read, Seek, SeekFrom, Write};
use std::time::Duration;

pub trait ReadUtil: Read {
    /// Attempts to read an unsigned 8 bit integer from the reader.
    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Attempts to read an unsigned 16 bit big endian integer from the reader.
    fn read_be_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Attempts to read an unsigned 32 bit big endian integer from the reader.
    fn read_be_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Attempts to read an unsigned 64 bit big endian integer from the reader.
    fn read_be_u64(&mut self) -> io::Result<u64> {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Attempts to read 8 bit unsigned integers from the reader to a vector of size length.
    fn read_u8_vec(&mut self, len: u64) -> io::Result<Vec<u8>> {
        let mut buf = vec![0; len as usize];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Attempts to read a utf-8 string from the reader.
    fn read_utf8(&mut self, len: u64) -> crate::Result<String> {
        let data = self.read_u8_vec(len)?;

        Ok(String::from_utf8(data)?)
    }
}

impl<T: Read> ReadUtil for T {}

pub trait SeekUtil: Seek {
    fn skip(&mut self, offset: i64) -> io::Result<()> {
        self.seek(SeekFrom::Current(offset))?;
        Ok(())
    }
}

impl<T: Seek> SeekUtil for T {}

pub trait WriteUtil: Write {
    fn write_be_u16(&mut self, val: u16) -> io::Result<()> {
        self.write_all(&val.to_be_bytes())
    }

    fn write_be_u32(&mut self, val: u32) -> io::Result<()> {
        self.write_all(&val.to_be_bytes())
    }

    fn write_be_u64(&mut self, val: u64) -> io::Result<()> {
        self.write_all(&val.to_be_bytes())
    }

    fn write_utf8(&mut self, string: &str) -> io::Result<()> {
        self.write_all(string.as_bytes())
    }
}

impl<T: Write> WriteUtil for T {}

pub fn scale_duration(timescale: u32, duration: u64) -> Duration {
    if timescale == 0 {
        return Duration::ZERO;
    }
    let secs = duration / timescale as u64;
    let nanos = (duration % timescale as u64) * 1_000_000_000 / timescale as u64;
    Duration::new(secs, nanos as u32)
}

/// Reads a big endian u32 out of a byte slice, or `None` past the end.
pub fn be_u32_at(bytes: &[u8], index: usize) -> Option<u32> {
    let end = index.checked_add(4)?;
    let b: [u8; 4] = bytes.get(index..end)?.try_into().ok()?;
    Some(u32::from_be_bytes(b))
}

/// Writes a big endian u32 into a byte slice at the specified index.
pub fn set_be_u32_at(bytes: &mut [u8], index: usize, val: u32) {
    bytes[index..index + 4].copy_from_slice(&val.to_be_bytes());
}

/// Writes a big endian u64 into a byte slice at the specified index.
pub fn set_be_u64_at(bytes: &mut [u8], index: usize, val: u64) {
    bytes[index..index + 8].copy_from_slice(&val.to_be_bytes());
}
