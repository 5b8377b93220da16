use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| "mmap failed")?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

/// A TSV source, either mapped from disk or streamed through gzip.
pub enum InputSource {
    Mmap(MmapSource),
    Gzip(Box<dyn Read + Send>),
}

impl InputSource {
    pub fn open(path: &Path) -> Result<Self> {
        match detect_input_kind(path)? {
            InputKind::Plain => Ok(InputSource::Mmap(MmapSource::open(path)?)),
            InputKind::Gzip => Ok(InputSource::Gzip(open_gzip_reader(path)?)),
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            InputSource::Mmap(_) => InputKind::Plain,
            InputSource::Gzip(_) => InputKind::Gzip,
        }
    }

    /// Mapped size for plain inputs; gzip streams report nothing.
    pub fn mapped_len(&self) -> Option<usize> {
        match self {
            InputSource::Mmap(m) => Some(m.len()),
            InputSource::Gzip(_) => None,
        }
    }

    pub fn reader(&mut self) -> Box<dyn Read + '_> {
        match self {
            InputSource::Mmap(m) => Box::new(m.bytes()),
            InputSource::Gzip(r) => Box::new(r),
        }
    }
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if ext == "gz" {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| "failed to read magic bytes")?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

pub fn open_gzip_reader(path: &Path) -> Result<Box<dyn Read + Send>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn plain_file_is_mapped() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"array\tstart\n0\t1\n").unwrap();
        let mut src = InputSource::open(tmp.path()).unwrap();
        assert_eq!(src.kind(), InputKind::Plain);
        assert_eq!(src.mapped_len(), Some(16));
        let mut text = String::new();
        src.reader().read_to_string(&mut text).unwrap();
        assert!(text.starts_with("array"));
    }

    #[test]
    fn gzip_detected_by_magic_bytes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"index\tdeletion\n").unwrap();
        tmp.write_all(&enc.finish().unwrap()).unwrap();
        let mut src = InputSource::open(tmp.path()).unwrap();
        assert_eq!(src.kind(), InputKind::Gzip);
        let mut text = String::new();
        src.reader().read_to_string(&mut text).unwrap();
        assert_eq!(text, "index\tdeletion\n");
    }
}
