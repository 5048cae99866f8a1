use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for document bundles inside an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Opaque handle for one client's wizard state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// High level status tracked for each submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Processing => "processing",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Badge accent the dashboard uses when rendering the status.
    pub const fn accent(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "gray",
            ApplicationStatus::Processing => "blue",
            ApplicationStatus::Approved => "green",
            ApplicationStatus::Rejected => "red",
        }
    }
}

/// Document categories collected by the wizard, one per upload step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Passport,
    Snils,
    BirthCertificate,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentKind::Passport => "Passport",
            DocumentKind::Snils => "SNILS",
            DocumentKind::BirthCertificate => "Birth certificate",
        }
    }
}

/// Tri-state branch choice for the birth-certificate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildrenDisclosure {
    OneChildUnderSeven,
    TwoChildrenUnderEighteen,
    NoChildren,
}

impl ChildrenDisclosure {
    pub const fn children(self) -> usize {
        match self {
            ChildrenDisclosure::OneChildUnderSeven => 1,
            ChildrenDisclosure::TwoChildrenUnderEighteen => 2,
            ChildrenDisclosure::NoChildren => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ChildrenDisclosure::OneChildUnderSeven => "one child under 7",
            ChildrenDisclosure::TwoChildrenUnderEighteen => "two children under 18",
            ChildrenDisclosure::NoChildren => "no children / family mortgage already used",
        }
    }
}

/// Transient reference to a locally picked file. Contents never leave the
/// client; only this metadata travels through the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
}

/// Personal identifiers collected on the final wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    pub inn: String,
    pub email: String,
}

/// One categorized bundle of staged files inside a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub files: Vec<StagedFile>,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn archive_entry(&self) -> ArchiveEntry {
        ArchiveEntry {
            document_id: self.id.clone(),
            label: self.kind.label(),
            file_count: self.files.len(),
            uploaded_on: display_date(self.uploaded_at),
        }
    }
}

/// A submitted application as held by the repository. Never mutated after
/// creation within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub details: ApplicantDetails,
    pub disclosure: ChildrenDisclosure,
    pub documents: Vec<Document>,
}

impl Application {
    pub fn history_entry(&self) -> ApplicationHistoryEntry {
        ApplicationHistoryEntry {
            application_id: self.id.clone(),
            status: self.status.label(),
            accent: self.status.accent(),
            submitted_on: display_date(self.submitted_at),
            documents: self
                .documents
                .iter()
                .map(|document| DocumentBadge {
                    label: document.kind.label(),
                    file_count: document.files.len(),
                })
                .collect(),
        }
    }
}

/// Everything the wizard drains out of a session on final submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSubmission {
    pub phone: String,
    pub details: ApplicantDetails,
    pub disclosure: ChildrenDisclosure,
    pub passport: Vec<StagedFile>,
    pub snils: Vec<StagedFile>,
    pub certificates: Vec<StagedFile>,
}

/// History tab row with derived display strings.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationHistoryEntry {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub accent: &'static str,
    pub submitted_on: String,
    pub documents: Vec<DocumentBadge>,
}

/// Per-document badge rendered inside a history row.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentBadge {
    pub label: &'static str,
    pub file_count: usize,
}

/// Archive tab row: one document bundle across all applications.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub document_id: DocumentId,
    pub label: &'static str,
    pub file_count: usize,
    pub uploaded_on: String,
}

/// `dd.mm.yyyy` display form used across the dashboard tabs.
pub fn display_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d.%m.%Y").to_string()
}
