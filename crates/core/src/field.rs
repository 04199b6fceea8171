use serde::{Deserialize, Serialize};

/// One of the five fields printed on a resident registration card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    NationalId,
    Address,
    IssueDate,
    IssuingOffice,
}

impl Field {
    /// Display order of the form.
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::NationalId,
        Field::Address,
        Field::IssueDate,
        Field::IssuingOffice,
    ];

    /// Stable identifier, independent of the UI language.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::NationalId => "national_id",
            Field::Address => "address",
            Field::IssueDate => "issue_date",
            Field::IssuingOffice => "issuing_office",
        }
    }

    /// Label shown next to the field on the form.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "이름",
            Field::NationalId => "주민등록번호",
            Field::Address => "주소",
            Field::IssueDate => "발행일",
            Field::IssuingOffice => "발행지역",
        }
    }

    pub fn is_multiline(self) -> bool {
        matches!(self, Field::Address)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for Field {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| format!("Unknown field: '{s}'"))
    }
}
