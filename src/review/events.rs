//! Notifications for hosts that track which files are under review.

use serde::Serialize;
use strum::Display;

use crate::models::{Decision, DocumentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewEventKind {
    /// A proposal was put under review.
    Added,
    /// The file's review finished with its last hunk accepted.
    Accepted,
    /// The file's review finished by rejection or the document closed.
    Rejected,
}

impl From<Decision> for ReviewEventKind {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accept => ReviewEventKind::Accepted,
            Decision::Reject => ReviewEventKind::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEvent {
    pub kind: ReviewEventKind,
    pub doc: DocumentId,
}

impl ReviewEvent {
    pub fn new(kind: ReviewEventKind, doc: DocumentId) -> Self {
        Self { kind, doc }
    }
}
