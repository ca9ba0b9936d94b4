/*
 * vSMTP mail transfer agent
 *
 * Copyright (C) 2003 - viridIT SAS
 * Licensed under the Elastic License 2.0
 *
 * You should have received a copy of the Elastic License 2.0 along with
 * this program. If not, see https://www.elastic.co/licensing/elastic-license.
 *
 */

/// Content of a message, following its header block.
///
/// Opening produces a fresh reader positioned at the start of the content,
/// so the same body can be read by several consumers.
pub trait Body: std::fmt::Debug + Send + Sync {
    /// Open a new reader over the content.
    ///
    /// # Errors
    ///
    /// * the content is not reachable anymore (i/o error)
    fn open(&self) -> std::io::Result<Box<dyn std::io::Read + Send>>;
}

/// Body held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBody(std::sync::Arc<[u8]>);

impl MemoryBody {
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let content: Vec<u8> = content.into();
        Self(content.into())
    }
}

impl Body for MemoryBody {
    fn open(&self) -> std::io::Result<Box<dyn std::io::Read + Send>> {
        Ok(Box::new(std::io::Cursor::new(ArcBytes(self.0.clone()))))
    }
}

#[derive(Debug)]
struct ArcBytes(std::sync::Arc<[u8]>);

impl AsRef<[u8]> for ArcBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Body stored on disk, starting at `offset` in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBody {
    path: std::path::PathBuf,
    offset: u64,
}

impl FileBody {
    #[must_use]
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
        }
    }

    /// Skip the first `offset` bytes of the file, for files that also hold the header block.
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

impl Body for FileBody {
    fn open(&self) -> std::io::Result<Box<dyn std::io::Read + Send>> {
        let mut file = std::fs::File::open(&self.path)?;
        std::io::Seek::seek(&mut file, std::io::SeekFrom::Start(self.offset))?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }
}
