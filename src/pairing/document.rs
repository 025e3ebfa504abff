//! Scanned documents and the identifiers that pair them

use std::fmt;
use std::path::{Path, PathBuf};

/// Which side of a pair a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentKind {
    /// Community Board resolution
    Resolution,
    /// SLA stipulation
    Stipulation,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resolution => "resolution",
            DocumentKind::Stipulation => "stipulation",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The shared token that pairs a resolution with its stipulation
///
/// Numeric tokens compare by value so `0101` and `101` pair up. Numbers
/// sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    Number(u64),
    Text(String),
}

impl Identifier {
    /// Build an identifier from an extracted token, None if it is blank
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        if token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = token.parse::<u64>() {
                return Some(Identifier::Number(n));
            }
        }

        Some(Identifier::Text(token.to_lowercase()))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => f.pad(&n.to_string()),
            Identifier::Text(s) => f.pad(s),
        }
    }
}

/// A classified PDF found while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub identifier: Identifier,
    pub kind: DocumentKind,
}

impl DocumentRef {
    /// File name used for ordering and display
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_identifiers_ignore_leading_zeros() {
        assert_eq!(Identifier::parse("0101"), Identifier::parse("101"));
        assert_eq!(Identifier::parse(" 7 "), Some(Identifier::Number(7)));
    }

    #[test]
    fn test_text_identifiers_are_case_insensitive() {
        assert_eq!(Identifier::parse("SLA-12a"), Some(Identifier::Text("sla-12a".into())));
        assert_eq!(Identifier::parse("   "), None);
    }

    #[test]
    fn test_identifier_ordering() {
        let mut ids = vec![
            Identifier::Text("a1".into()),
            Identifier::Number(102),
            Identifier::Number(9),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                Identifier::Number(9),
                Identifier::Number(102),
                Identifier::Text("a1".into()),
            ]
        );
    }

    #[test]
    fn test_display_honours_padding() {
        assert_eq!(format!("{:<5}|", Identifier::Number(42)), "42   |");
    }

    #[test]
    fn test_oversized_number_falls_back_to_text() {
        let id = Identifier::parse("99999999999999999999999").unwrap();
        assert!(matches!(id, Identifier::Text(_)));
    }
}
