//! Path level wrappers around the buffer-pure operations.
//!
//! Offset rewriting needs the whole file in memory, so the discipline is
//! read all, mutate, write to a temporary sibling, then rename over the
//! original.

use std::fs;
use std::path::{Path, PathBuf};

/// Reads the file at the path into memory.
pub fn read_file(path: impl AsRef<Path>) -> crate::Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Reads the file, runs the mutation on its bytes and atomically replaces the
/// file with the result.
pub fn update_file(
    path: impl AsRef<Path>,
    f: impl FnOnce(&[u8]) -> crate::Result<Vec<u8>>,
) -> crate::Result<()> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let new = f(&bytes)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, &new)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn update_replaces_content() {
        let dir = std::env::temp_dir();
        let path = dir.join("mp4stems-update-test.bin");
        fs::write(&path, [1, 2, 3]).unwrap();

        update_file(&path, |bytes| {
            let mut out = bytes.to_vec();
            out.push(4);
            Ok(out)
        })
        .unwrap();

        assert_eq!(fs::read(&path).unwrap(), [1, 2, 3, 4]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_update_leaves_file_untouched() {
        let dir = std::env::temp_dir();
        let path = dir.join("mp4stems-update-err-test.bin");
        fs::write(&path, [1, 2, 3]).unwrap();

        let result = update_file(&path, |_| {
            Err(crate::Error::new(crate::ErrorKind::InvalidContainer, "nope"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), [1, 2, 3]);
        fs::remove_file(&path).unwrap();
    }
}
