use std::fmt;

use serde::{Deserialize, Serialize};

/// Document lifecycle. `Completed` and `Failed` are terminal for a run;
/// reprocessing re-enters through `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Legal transitions. `Processing -> Processing` is deliberately
    /// absent: a document stranded mid-run must be reset by a supervisor
    /// before it can be picked up again.
    pub fn can_transition(self, to: DocumentStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Processing)
                | (Self::Completed, Self::Processing)
                | (Self::Failed, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
