use std::fs;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use log::debug;

use super::document::Document;
use super::parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// A [`Document`] that was read from disk.
#[derive(Debug, Default, PartialEq)]
pub struct DocumentFile {
    path: PathBuf,
    doc: Document,
}

impl Deref for DocumentFile {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        &self.doc
    }
}

impl DerefMut for DocumentFile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.doc
    }
}

impl DocumentFile {
    pub fn load_from_path(path: &Path) -> Result<Self, IoError> {
        debug!("loading {path:?}");

        let buf = fs::read_to_string(path)?;

        Ok(DocumentFile {
            path: path.into(),
            doc: Document::load_from_str(buf.as_str())?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}
