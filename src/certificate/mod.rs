use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

/// The three certificate template families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Basic,
    License,
    Token,
}

impl Kind {
    pub fn from_segment(segment: &str) -> Option<Kind> {
        match segment {
            "basic" => Some(Kind::Basic),
            "license" => Some(Kind::License),
            "token" => Some(Kind::Token),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Basic => "basic",
            Kind::License => "license",
            Kind::Token => "token",
        }
    }

    /// File-name suffix per kind. The token double underscore is the
    /// historical name generated files have always carried; existing
    /// download links depend on it.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Kind::Basic => "certificate",
            Kind::License => "license_certificate",
            Kind::Token => "token__certificate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CopyrightClause {
    Adaption,
    Storage,
    Placement,
    Publication,
    Metadata,
    Demonstration,
    Advertising,
    PersonalUse,
}

impl CopyrightClause {
    pub const ALL: [CopyrightClause; 8] = [
        CopyrightClause::Adaption,
        CopyrightClause::Storage,
        CopyrightClause::Placement,
        CopyrightClause::Publication,
        CopyrightClause::Metadata,
        CopyrightClause::Demonstration,
        CopyrightClause::Advertising,
        CopyrightClause::PersonalUse,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            CopyrightClause::Adaption => "adaption",
            CopyrightClause::Storage => "storage",
            CopyrightClause::Placement => "placement",
            CopyrightClause::Publication => "publication",
            CopyrightClause::Metadata => "metadata",
            CopyrightClause::Demonstration => "demonstration",
            CopyrightClause::Advertising => "advertising",
            CopyrightClause::PersonalUse => "personal_use",
        }
    }

    pub fn from_tag(tag: &str) -> Option<CopyrightClause> {
        CopyrightClause::ALL
            .into_iter()
            .find(|clause| clause.tag() == tag)
    }
}

/// Builds the copyrights set from submitted form values. Clients send the
/// tags either as repeated fields or as one comma-separated list; unknown
/// tags are dropped.
pub fn collect_copyrights<'a>(
    values: impl IntoIterator<Item = &'a str>,
) -> BTreeSet<CopyrightClause> {
    let mut clauses = BTreeSet::new();
    for value in values {
        for part in value.split(',') {
            let tag = part.trim();
            if tag.is_empty() {
                continue;
            }
            match CopyrightClause::from_tag(tag) {
                Some(clause) => {
                    clauses.insert(clause);
                }
                None => tracing::debug!("Ignoring unknown copyright tag: {}", tag),
            }
        }
    }
    clauses
}

/// Validated input to one render operation.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    pub kind: Kind,
    pub preview_image: Option<PathBuf>,
    pub fields: HashMap<String, String>,
    pub copyrights: BTreeSet<CopyrightClause>,
    /// Base URL the download link and QR payload are built from.
    pub origin: String,
}

impl CertificateRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// The persisted output of a successful render.
#[derive(Debug, Clone)]
pub struct GeneratedCertificate {
    pub file_name: String,
    pub path: PathBuf,
    pub download_url: String,
}
