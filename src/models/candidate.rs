use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::models::job::Job;

pub const CUSTOM_FIELD_PREFIX: &str = "custom_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HrStatus {
    Hold,
    Shortlisted,
    Rejected,
}

impl HrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HrStatus::Hold => "hold",
            HrStatus::Shortlisted => "shortlisted",
            HrStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hold" => Some(HrStatus::Hold),
            "shortlisted" => Some(HrStatus::Shortlisted),
            "rejected" => Some(HrStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Scheduled,
    Taken,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Taken => "taken",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(InterviewStatus::Scheduled),
            "taken" => Some(InterviewStatus::Taken),
            _ => None,
        }
    }
}

/// Ordered label -> answer map captured from the dynamic `custom_*` form
/// fields. Keeps submission order and exact labels; assigning to an existing
/// label updates the value in place without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomAnswers(Vec<(String, String)>);

impl CustomAnswers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Explicit extraction step for submitted form fields: keeps fields whose
    /// key carries the `custom_` marker, strips the marker from the label,
    /// ignores everything else.
    pub fn from_form_fields(fields: Vec<(String, String)>) -> Self {
        let mut answers = Self::new();
        for (key, value) in fields {
            if let Some(label) = key.strip_prefix(CUSTOM_FIELD_PREFIX) {
                answers.set(label.to_string(), value);
            }
        }
        answers
    }

    pub fn set(&mut self, label: String, value: String) {
        if let Some(entry) = self.0.iter_mut().find(|(l, _)| *l == label) {
            entry.1 = value;
        } else {
            self.0.push((label, value));
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for CustomAnswers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CustomAnswers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AnswersVisitor;

        impl<'de> Visitor<'de> for AnswersVisitor {
            type Value = CustomAnswers;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of answer labels to answer strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut answers = CustomAnswers::new();
                while let Some((label, value)) = access.next_entry::<String, String>()? {
                    answers.set(label, value);
                }
                Ok(answers)
            }
        }

        deserializer.deserialize_map(AnswersVisitor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub phone_normalized: String,
    pub job_id: i64,
    pub resume_url: String,
    pub application_status: ApplicationStatus,
    pub hr_status: Option<HrStatus>,
    pub interview_status: Option<InterviewStatus>,
    pub ats_score: Option<i32>,
    pub summary: Option<String>,
    pub shortlisting_reason: Option<String>,
    pub custom_answers: CustomAnswers,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload; the record always starts as `pending` with no score.
#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub phone_normalized: String,
    pub job_id: i64,
    pub resume_url: String,
    pub custom_answers: CustomAnswers,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CandidateUpdate {
    pub job_id: Option<i64>,
    pub application_status: Option<ApplicationStatus>,
    pub hr_status: Option<HrStatus>,
    pub interview_status: Option<InterviewStatus>,
    pub ats_score: Option<i32>,
    pub summary: Option<String>,
    pub shortlisting_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CandidateWithJob {
    pub candidate: Candidate,
    pub job: Job,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_answers_preserve_submission_order() {
        let answers = CustomAnswers::from_form_fields(vec![
            ("custom_Willing to relocate to Pune".into(), "Yes".into()),
            ("custom_Notice period".into(), "30 days".into()),
            ("custom_Current CTC".into(), "12 LPA".into()),
        ]);

        let labels: Vec<&str> = answers.iter().map(|(l, _)| l).collect();
        assert_eq!(
            labels,
            vec!["Willing to relocate to Pune", "Notice period", "Current CTC"]
        );
    }

    #[test]
    fn extraction_ignores_fields_without_the_marker() {
        let answers = CustomAnswers::from_form_fields(vec![
            ("name".into(), "Asha".into()),
            ("custom_Notice period".into(), "15 days".into()),
            ("utm_source".into(), "linkedin".into()),
        ]);

        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get("Notice period"), Some("15 days"));
        assert_eq!(answers.get("name"), None);
    }

    #[test]
    fn setting_an_existing_label_updates_in_place() {
        let mut answers = CustomAnswers::new();
        answers.set("A".into(), "1".into());
        answers.set("B".into(), "2".into());
        answers.set("A".into(), "3".into());

        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("A"), Some("3"));
        let labels: Vec<&str> = answers.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["A", "B"]);
    }

    #[test]
    fn serde_round_trip_keeps_order() {
        let mut answers = CustomAnswers::new();
        answers.set("Zebra".into(), "z".into());
        answers.set("Alpha".into(), "a".into());

        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"Zebra":"z","Alpha":"a"}"#);

        let back: CustomAnswers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }

    #[test]
    fn status_enums_parse_their_wire_values() {
        assert_eq!(
            ApplicationStatus::parse("pending"),
            Some(ApplicationStatus::Pending)
        );
        assert_eq!(ApplicationStatus::parse("on-hold"), None);
        assert_eq!(HrStatus::parse("hold"), Some(HrStatus::Hold));
        assert_eq!(
            InterviewStatus::parse("scheduled"),
            Some(InterviewStatus::Scheduled)
        );
        assert_eq!(InterviewStatus::parse("done"), None);
        assert_eq!(InterviewStatus::Taken.as_str(), "taken");
    }
}
