//! Resolution/stipulation pairing
//!
//! Documents are identified and classified by file name only, using a
//! [`Convention`]. Nothing here opens a PDF.

pub mod convention;
pub mod document;
pub mod matcher;

pub use convention::{Convention, ConventionSettings};
pub use document::{DocumentKind, DocumentRef, Identifier};
pub use matcher::{
    list_pdfs, pair_documents, scan_folder, GroupState, MatchGroup, Pairing, PairingIssue,
    UnmatchedReason,
};
