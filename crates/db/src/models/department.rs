use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;

/// Business department a job is filed under. Any tag that does not name one
/// of the known departments is treated as `General`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    EnumIter,
    Display,
    Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Department {
    Hire,
    Fabrication,
    Sales,
    Testing,
    Transport,
    Engineering,
    Clients,
    Admin,
    #[default]
    General,
}

impl Department {
    /// Case-insensitive exact match; never fails.
    pub fn from_tag(tag: Option<&str>) -> Self {
        tag.and_then(|t| t.parse().ok()).unwrap_or_default()
    }

    /// Department implied by the job type picked on the job forms.
    pub fn from_job_type(job_type: &str) -> Self {
        match job_type {
            "Hire" => Self::Hire,
            "Engineering" => Self::Engineering,
            "Fabrication" => Self::Fabrication,
            "Sales" => Self::Sales,
            "Testing" => Self::Testing,
            "Transport" => Self::Transport,
            "Clients" => Self::Clients,
            _ => Self::General,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Hire => "LEH",
            Self::Fabrication => "LEF",
            Self::Sales => "LES",
            Self::Testing => "LET",
            Self::Transport => "LEX",
            Self::Engineering => "LEE",
            Self::Clients => "LEC",
            Self::Admin => "LEA",
            Self::General => "LEG",
        }
    }
}
