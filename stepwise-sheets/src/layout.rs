//! Mapping a submission onto a fixed-width sheet row.

use chrono::{DateTime, SecondsFormat, Utc};
use stepwise::Responses;

/// Column name of the server-assigned submission time.
pub const TIMESTAMP: &str = "timestamp";

/// Column name of the respondent's address.
pub const IP_ADDRESS: &str = "ip_address";

/// Recorded when no forwarded address is available.
pub const UNKNOWN_IP: &str = "unknown";

/// Row 1 of the response sheet. Order is part of the sheet's contract;
/// new questions are appended, never inserted.
pub const SHEET_HEADERS: &[&str] = &[
    "timestamp",
    "ip_address",
    "member_status_check",
    "age_group",
    "gender",
    "political_affiliation",
    "marital_status",
    "has_children",
    "number_of_children",
    "member_status",
    "served_mission",
    "church_activity_level",
    "geographic_region",
    "education_level",
    "calling_type",
    "freq_pray",
    "freq_second_hour",
    "freq_come_follow_me",
    "freq_calling",
    "freq_family_history",
    "freq_scripture_study",
    "freq_temple",
    "freq_bom",
    "freq_dc",
    "freq_pgp",
    "freq_ot",
    "freq_nt",
    "sat_prayer",
    "sat_second_hour",
    "sat_come_follow_me",
    "sat_calling",
    "sat_family_history",
    "sat_scripture_study",
    "sat_temple",
    "belief_priesthood_ban_inspired",
    "belief_gender_eternal",
    "belief_sexual_relations_married_only",
    "belief_children_born_in_matrimony",
    "belief_happiness_through_christ",
    "belief_proclamation_inspired",
    "belief_abortion_church_position",
    "belief_tithing_commandment",
    "belief_wow_alcohol",
    "belief_wow_vaping",
    "belief_wow_marijuana",
    "belief_wow_coffee",
    "belief_wow_tea",
    "belief_wow_caffeine",
    "belief_bom_literal_history",
    "belief_ordinances_essential",
    "belief_prophets_can_err",
    "belief_revelation_allows_change",
    "belief_women_priesthood",
    "belief_lgbtq_faithful_relationships",
    "belief_progression_between_kingdoms",
    "lifestyle_play_video_games",
    "lifestyle_watch_r_movies",
    "lifestyle_multiple_piercings_ok",
    "lifestyle_tattoos_ok",
    "lifestyle_homeschooling",
    "lifestyle_holistic_preference",
    "lifestyle_mental_health_meds_ok",
    "lifestyle_vasectomy_ok",
    "lifestyle_birth_control_ok",
    "lifestyle_support_no_baptism_age_8",
    "lifestyle_mothers_stay_home",
    "social_enjoy_ward",
    "social_friends_lds",
    "social_friends_non_lds",
    "social_mission_enjoy",
    "social_children_friends",
    "social_left_church_touch",
    "social_respect_leave",
    "align_conservative",
    "align_liberal",
    "church_discipline",
    "transparency_history",
    "transparency_finances",
    "child_marry_non_lds",
];

/// A validated answer set plus the fields the server assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub timestamp: String,
    pub ip_address: String,
    pub answers: Responses,
}

impl SubmissionRecord {
    /// Stamp `answers` with the current time and the given address.
    pub fn new(answers: Responses, ip_address: impl Into<String>) -> Self {
        Self::at(Utc::now(), answers, ip_address)
    }

    /// Stamp `answers` with a fixed time.
    pub fn at(time: DateTime<Utc>, answers: Responses, ip_address: impl Into<String>) -> Self {
        Self {
            timestamp: iso_timestamp(time),
            ip_address: ip_address.into(),
            answers,
        }
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn iso_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reduce an `X-Forwarded-For` value to the originating client address.
///
/// Multi-hop values keep only the first entry. A missing or blank header
/// yields [`UNKNOWN_IP`].
pub fn client_ip(forwarded_for: Option<&str>) -> String {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_IP)
        .to_string()
}

/// An ordered list of column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    headers: Vec<String>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::new(SHEET_HEADERS.iter().copied())
    }
}

impl SheetLayout {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// One cell per header: the assigned fields, the answer's text, or an
    /// empty string for anything unanswered.
    pub fn row(&self, record: &SubmissionRecord) -> Vec<String> {
        self.headers
            .iter()
            .map(|header| match header.as_str() {
                TIMESTAMP => record.timestamp.clone(),
                IP_ADDRESS => record.ip_address.clone(),
                id => record.answers.cell(id),
            })
            .collect()
    }
}
