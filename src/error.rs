//! Error types for the SLA merge library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SLA merge library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input folder missing or not a directory
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// Auto mode folder holds no PDF files
    #[error("No PDF files found in folder: {}", .0.display())]
    NoPdfsFound(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Corrupt or inaccessible PDF
    #[error("Unreadable PDF {}: {source}", .path.display())]
    UnreadablePdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Concatenating or writing one match group failed
    #[error("Merge failed for group {group}: {source}")]
    Merge {
        group: String,
        #[source]
        source: Box<Error>,
    },

    /// Naming convention rejected
    #[error("Invalid naming convention: {0}")]
    InvalidConvention(String),

    /// Naming convention file could not be parsed
    #[error("Invalid convention file {}: {source}", .path.display())]
    ConventionFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Output name is not a PDF file name
    #[error("Output file must end in .pdf: {}", .0.display())]
    InvalidOutputName(PathBuf),

    /// Both manual inputs point at the same file
    #[error("Cannot merge a file with itself: {}", .0.display())]
    SameInput(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// The input file this error is about, when there is one
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::FileNotFound(path)
            | Error::FolderNotFound(path)
            | Error::NoPdfsFound(path)
            | Error::EmptyPdf(path)
            | Error::InvalidOutputName(path)
            | Error::SameInput(path) => Some(path),
            Error::UnreadablePdf { path, .. } | Error::ConventionFile { path, .. } => Some(path),
            Error::Merge { source, .. } => source.path(),
            _ => None,
        }
    }
}
