//! Course plan documents and their validated forms.
//!
//! A plan goes through three shapes:
//! - [`PlanDocument`]: serde view of the JSON/TOML file.
//! - [`PlanDraft`]: every item normalized, dates in the schedule zone.
//! - [`CoursePlan`]: start date checked and course id resolved; ready to run.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::directory::{DirectoryResolver, ResolvedId};
use crate::error::ConfigError;
use crate::time::{PlanDate, to_fixed};
use crate::work::{RawWorkItem, WorkItem, normalize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Course name, matched exactly against the platform.
    pub name: String,
    pub start_date: PlanDate,
    pub items: Vec<RawWorkItem>,
}

impl PlanDocument {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub course_name: String,
    pub start_date: DateTime<Tz>,
    pub items: Vec<WorkItem>,
}

impl PlanDraft {
    pub fn from_document(doc: &PlanDocument, tz: Tz) -> Result<Self, ConfigError> {
        let start_date = doc.start_date.resolve(tz).map_err(|reason| {
            ConfigError::InvalidStartDate {
                value: doc.start_date.text(),
                reason,
            }
        })?;

        let items = doc
            .items
            .iter()
            .map(|raw| normalize(raw, tz))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            course_name: doc.name.clone(),
            start_date,
            items,
        })
    }

    pub fn to_document(&self) -> PlanDocument {
        PlanDocument {
            name: self.course_name.clone(),
            start_date: to_fixed(&self.start_date).to_rfc3339().into(),
            items: self.items.iter().map(WorkItem::to_raw).collect(),
        }
    }

    /// The start date must be strictly after `now`.
    pub fn ensure_future_start(&self, now: DateTime<Utc>) -> Result<(), ConfigError> {
        if self.start_date.with_timezone(&Utc) <= now {
            return Err(ConfigError::StartDateInPast {
                start: to_fixed(&self.start_date).to_rfc3339(),
                now: now.to_rfc3339(),
            });
        }
        Ok(())
    }
}

/// A plan bound to a real course, ready for the executor.
#[derive(Debug, Clone)]
pub struct CoursePlan {
    course_id: ResolvedId,
    draft: PlanDraft,
}

impl CoursePlan {
    /// Check the start date, then resolve the course.
    ///
    /// The start-date check happens before any remote call.
    pub async fn load(
        draft: PlanDraft,
        now: DateTime<Utc>,
        resolver: &DirectoryResolver<'_>,
    ) -> Result<Self, ConfigError> {
        draft.ensure_future_start(now)?;

        let course_id = resolver
            .find_course_id(&draft.course_name)
            .await
            .ok_or_else(|| ConfigError::CourseNotFound(draft.course_name.clone()))?;

        Ok(Self { course_id, draft })
    }

    pub fn course_id(&self) -> &ResolvedId {
        &self.course_id
    }

    pub fn course_name(&self) -> &str {
        &self.draft.course_name
    }

    pub fn start_date(&self) -> &DateTime<Tz> {
        &self.draft.start_date
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.draft.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::DateOffset;
    use crate::work::WorkKind;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    const PLAN_JSON: &str = r#"{
        "name": "Intro to Physics",
        "start_date": "2025-06-01T09:00:00",
        "semester": "fall",
        "items": [
            {"kind": "material", "name": "Syllabus", "topic": "Admin",
             "publish_after": {"weeks": 0, "days": 0}, "files": ["syllabus.pdf"]},
            {"kind": "assignment", "name": "HW1", "topic": "Unit 1",
             "publish_after": {"days": 3}, "due_after": {"weeks": 1},
             "files": ["hw1.pdf"], "max_points": 25}
        ]
    }"#;

    const PLAN_TOML: &str = r#"
name = "Intro to Physics"
start_date = "2025-06-01T09:00:00"

[[items]]
kind = "material"
name = "Syllabus"
topic = "Admin"
files = ["syllabus.pdf"]

[[items]]
kind = "assignment"
name = "HW1"
topic = "Unit 1"
publish_after = { days = 3 }
due_after = [1, 0]
files = ["hw1.pdf"]
max_points = 25
"#;

    #[test]
    fn json_and_toml_agree() {
        let a = PlanDraft::from_document(&PlanDocument::from_json_str(PLAN_JSON).unwrap(), New_York)
            .unwrap();
        let b = PlanDraft::from_document(&PlanDocument::from_toml_str(PLAN_TOML).unwrap(), New_York)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.items.len(), 2);
        assert_eq!(a.items[1].kind, WorkKind::Assignment);
        assert_eq!(a.items[1].due_offset, Some(DateOffset::new(1, 0)));
        assert_eq!(a.start_date, New_York.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn toml_native_dates_are_accepted() {
        let plan = r#"
name = "Intro to Physics"
start_date = 2025-06-01T09:00:00

[[items]]
kind = "material"
name = "Syllabus"
topic = "Admin"
files = ["syllabus.pdf"]

[[items]]
kind = "assignment"
name = "HW1"
topic = "Unit 1"
publish_date = 2025-06-04
due_date = 2025-06-11T13:00:00Z
max_points = 25
"#;
        let doc = PlanDocument::from_toml_str(plan).unwrap();
        assert!(matches!(doc.start_date, PlanDate::Toml(_)));

        let draft = PlanDraft::from_document(&doc, New_York).unwrap();
        assert_eq!(draft.start_date, New_York.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());

        let hw = &draft.items[1];
        assert_eq!(
            hw.publish_date,
            Some(New_York.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap())
        );
        // 13:00Z is 09:00 EDT
        assert_eq!(
            hw.due_date,
            Some(New_York.with_ymd_and_hms(2025, 6, 11, 9, 0, 0).unwrap())
        );

        let quoted =
            PlanDraft::from_document(&PlanDocument::from_toml_str(PLAN_TOML).unwrap(), New_York)
                .unwrap();
        assert_eq!(draft.start_date, quoted.start_date);

        let again = PlanDraft::from_document(&draft.to_document(), New_York).unwrap();
        assert_eq!(draft, again);
    }

    #[test]
    fn toml_local_time_alone_is_not_a_date() {
        let plan = "name = \"x\"\nstart_date = 09:00:00\nitems = []\n";
        let doc = PlanDocument::from_toml_str(plan).unwrap();
        assert!(matches!(
            PlanDraft::from_document(&doc, New_York),
            Err(ConfigError::InvalidStartDate { .. })
        ));
    }

    #[test]
    fn missing_items_is_a_parse_error() {
        let err = PlanDocument::from_json_str(r#"{"name": "x", "start_date": "2025-06-01"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn bad_start_date() {
        let doc = PlanDocument {
            name: "x".into(),
            start_date: "June 1st".into(),
            items: vec![],
        };
        assert!(matches!(
            PlanDraft::from_document(&doc, New_York),
            Err(ConfigError::InvalidStartDate { .. })
        ));
    }

    #[test]
    fn item_errors_surface() {
        let doc = PlanDocument::from_json_str(
            r#"{"name": "x", "start_date": "2025-06-01", "items": [{"kind": "lecture", "name": "L1"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            PlanDraft::from_document(&doc, New_York),
            Err(ConfigError::UnknownKind { .. })
        ));
    }

    #[test]
    fn start_date_must_be_strictly_future() {
        let draft =
            PlanDraft::from_document(&PlanDocument::from_json_str(PLAN_JSON).unwrap(), New_York)
                .unwrap();
        let at_start = draft.start_date.with_timezone(&Utc);

        assert!(draft.ensure_future_start(at_start - chrono::Duration::seconds(1)).is_ok());
        assert!(matches!(
            draft.ensure_future_start(at_start),
            Err(ConfigError::StartDateInPast { .. })
        ));
    }

    #[test]
    fn document_round_trip_keeps_the_draft() {
        let draft =
            PlanDraft::from_document(&PlanDocument::from_json_str(PLAN_JSON).unwrap(), New_York)
                .unwrap();
        let again = PlanDraft::from_document(&draft.to_document(), New_York).unwrap();
        assert_eq!(draft, again);
    }
}
