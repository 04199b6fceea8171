use std::sync::OnceLock;

use idcard_core::{ExtractionResult, Field};
use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_national_id, r"\d{6}-\d{7}");
re!(re_parenthesized, r"\(.*?\)");
re!(re_year, r"^[0-9]{4}$");
re!(re_month, r"^[0-9]+$");
re!(re_day, r"^[0-9]{1,2}\.?$");

/// Card title line; the line above an ID number is not a name when it contains this.
const TITLE_MARKER: &str = "주민등록증";
/// "Head of office", closing the issuing authority line (e.g. `강남구청장`).
const OFFICE_MARKER: &str = "청장";
/// City / district / neighborhood / unit markers.
const ADDRESS_MARKERS: [&str; 4] = ["시", "구", "동", "호"];

// ── Matchers ──────────────────────────────────────────────────────────────────

/// A partial update produced by a matcher for one line position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Set(Field, String),
    AppendAddress(String),
}

/// A single classification rule. Receives the whole (trimmed) line sequence, the
/// current index and the result built so far.
pub type Matcher = fn(&[&str], usize, &ExtractionResult) -> Vec<FieldUpdate>;

/// Run at every index, in this order. Later updates overwrite earlier ones.
pub const MATCHERS: [Matcher; 3] = [match_national_id, match_issue_date, match_office_or_address];

/// ID number (first match wins) plus the name on the line right above it.
pub fn match_national_id(lines: &[&str], i: usize, current: &ExtractionResult) -> Vec<FieldUpdate> {
    let line = lines[i];
    if current.is_set(Field::NationalId) || !re_national_id().is_match(line) {
        return vec![];
    }

    let mut updates = vec![FieldUpdate::Set(Field::NationalId, line.to_string())];
    if let Some(name) = i.checked_sub(1).and_then(|prev| name_from(lines[prev])) {
        updates.push(FieldUpdate::Set(Field::Name, name));
    }
    updates
}

fn name_from(line: &str) -> Option<String> {
    if line.contains(TITLE_MARKER) {
        return None;
    }
    let name = re_parenthesized().replace_all(line, "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Year / month / day spread over three consecutive lines. Every complete triple
/// overwrites the previous one, so the last triple in scan order is kept.
pub fn match_issue_date(lines: &[&str], i: usize, _current: &ExtractionResult) -> Vec<FieldUpdate> {
    let [year, month, day] = match lines.get(i..i + 3) {
        Some(&[y, m, d]) => [y, m, d],
        _ => return vec![],
    };
    if !(re_year().is_match(year) && re_month().is_match(month) && re_day().is_match(day)) {
        return vec![];
    }
    let day = day.replace('.', "");
    vec![FieldUpdate::Set(Field::IssueDate, format!("{year}.{month}.{day}"))]
}

/// Issuing office line (last wins), otherwise an address fragment.
pub fn match_office_or_address(lines: &[&str], i: usize, _current: &ExtractionResult) -> Vec<FieldUpdate> {
    let line = lines[i];
    let is_office = line.contains(OFFICE_MARKER);
    let has_address_marker = ADDRESS_MARKERS.iter().any(|m| line.contains(m));

    let mut updates = Vec::new();
    if is_office {
        updates.push(FieldUpdate::Set(Field::IssuingOffice, line.to_string()));
    }
    if has_address_marker && !is_office {
        updates.push(FieldUpdate::AppendAddress(line.to_string()));
    }
    updates
}

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Classify OCR output lines into card fields. Lines are trimmed at the edges;
    /// fields with no matching line stay unset.
    pub fn extract<S: AsRef<str>>(lines: &[S]) -> ExtractionResult {
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).collect();
        tracing::debug!(?lines, "OCR lines");

        let mut result = ExtractionResult::default();
        let mut address_parts: Vec<String> = Vec::new();

        for i in 0..lines.len() {
            for matcher in MATCHERS {
                for update in matcher(&lines, i, &result) {
                    match update {
                        FieldUpdate::Set(field, value) => result.set(field, value),
                        FieldUpdate::AppendAddress(part) => address_parts.push(part),
                    }
                }
            }
        }

        if !address_parts.is_empty() {
            result.set(Field::Address, address_parts.join(" "));
        }
        result
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
