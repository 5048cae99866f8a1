use serde::{Deserialize, Serialize};

use super::super::domain::{ChildrenDisclosure, DocumentKind};

/// File-count ceilings enforced while staging wizard uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeLimits {
    pub passport_max_files: usize,
    pub snils_max_files: usize,
    pub certificates_per_child: usize,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            passport_max_files: 20,
            snils_max_files: 1,
            certificates_per_child: 2,
        }
    }
}

impl IntakeLimits {
    /// Ceiling for one category. Birth certificates scale with the disclosed
    /// number of children; `None` disclosure admits no certificate files.
    pub fn ceiling(&self, kind: DocumentKind, disclosure: Option<ChildrenDisclosure>) -> usize {
        match kind {
            DocumentKind::Passport => self.passport_max_files,
            DocumentKind::Snils => self.snils_max_files,
            DocumentKind::BirthCertificate => disclosure
                .map(|choice| choice.children() * self.certificates_per_child)
                .unwrap_or(0),
        }
    }
}
