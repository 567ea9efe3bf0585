//! Human-readable search filters mapped to the provider's query codes.

use serde::{Deserialize, Serialize};

const DATE_SINCE_POSTED: &[(&str, &str)] = &[
    ("past month", "r2592000"),
    ("past week", "r604800"),
    ("24hr", "r86400"),
];

const EXPERIENCE_LEVEL: &[(&str, &str)] = &[
    ("internship", "1"),
    ("entry level", "2"),
    ("associate", "3"),
    ("senior", "4"),
    ("director", "5"),
    ("executive", "6"),
];

const JOB_TYPE: &[(&str, &str)] = &[
    ("full time", "F"),
    ("full-time", "F"),
    ("part time", "P"),
    ("part-time", "P"),
    ("contract", "C"),
    ("temporary", "T"),
    ("volunteer", "V"),
    ("internship", "I"),
];

const REMOTE_FILTER: &[(&str, &str)] = &[
    ("on-site", "1"),
    ("on site", "1"),
    ("remote", "2"),
    ("hybrid", "3"),
];

const SALARY: &[(&str, &str)] = &[
    ("40000", "1"),
    ("60000", "2"),
    ("80000", "3"),
    ("100000", "4"),
    ("120000", "5"),
];

/// The filterable dimensions of a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TermCategory {
    DateSincePosted,
    ExperienceLevel,
    JobType,
    RemoteFilter,
    Salary,
}

impl TermCategory {
    pub const ALL: [TermCategory; 5] = [
        TermCategory::DateSincePosted,
        TermCategory::ExperienceLevel,
        TermCategory::JobType,
        TermCategory::RemoteFilter,
        TermCategory::Salary,
    ];

    /// Exact, case-sensitive category name as used in query objects.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            TermCategory::DateSincePosted => "dateSincePosted",
            TermCategory::ExperienceLevel => "experienceLevel",
            TermCategory::JobType => "jobType",
            TermCategory::RemoteFilter => "remoteFilter",
            TermCategory::Salary => "salary",
        }
    }

    /// URL parameter the translated code is sent under.
    pub fn param(self) -> &'static str {
        match self {
            TermCategory::DateSincePosted => "f_TPR",
            TermCategory::ExperienceLevel => "f_E",
            TermCategory::JobType => "f_JT",
            TermCategory::RemoteFilter => "f_WT",
            TermCategory::Salary => "f_SB2",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            TermCategory::DateSincePosted => DATE_SINCE_POSTED,
            TermCategory::ExperienceLevel => EXPERIENCE_LEVEL,
            TermCategory::JobType => JOB_TYPE,
            TermCategory::RemoteFilter => REMOTE_FILTER,
            TermCategory::Salary => SALARY,
        }
    }

    /// Provider code for `term`, or `""` when the term is not recognized.
    pub fn translate(self, term: &str) -> &'static str {
        let term = term.to_lowercase();
        self.table()
            .iter()
            .find(|(k, _)| *k == term)
            .map(|(_, code)| *code)
            .unwrap_or("")
    }
}

/// Looks up `term` under the category called `category`.
///
/// Unknown categories and unknown terms both yield `""`, which callers treat
/// as "no filter".
pub fn translate(category: &str, term: &str) -> &'static str {
    TermCategory::from_name(category)
        .map(|c| c.translate(term))
        .unwrap_or("")
}
