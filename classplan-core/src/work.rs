//! Work item model: one material or assignment in a course plan.
//!
//! Items arrive as [`RawWorkItem`] (straight from serde) and are turned into
//! a validated [`WorkItem`] by [`normalize`]. Absolute dates win over offsets.

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::offset::{DateOffset, DateOutOfRange};
use crate::time::{PlanDate, to_fixed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkKind {
    /// Informational post with attached files. Never has a due date.
    Material,
    /// Graded work with a due date.
    Assignment,
}

impl WorkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkKind::Material => "material",
            WorkKind::Assignment => "assignment",
        }
    }
}

impl FromStr for WorkKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "material" => Ok(WorkKind::Material),
            "assignment" => Ok(WorkKind::Assignment),
            _ => Err(()),
        }
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offset as written in a plan file: `{ weeks = 1, days = 2 }` or `[1, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOffset {
    Pair(u32, u32),
    Fields(OffsetFields),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetFields {
    #[serde(default)]
    pub weeks: u32,
    #[serde(default)]
    pub days: u32,
}

impl From<RawOffset> for DateOffset {
    fn from(raw: RawOffset) -> Self {
        match raw {
            RawOffset::Pair(weeks, days) => DateOffset::new(weeks, days),
            RawOffset::Fields(f) => DateOffset::new(f.weeks, f.days),
        }
    }
}

impl From<DateOffset> for RawOffset {
    fn from(offset: DateOffset) -> Self {
        RawOffset::Fields(OffsetFields {
            weeks: offset.weeks(),
            days: offset.days(),
        })
    }
}

/// A work item exactly as it appears in the plan source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWorkItem {
    pub kind: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_after: Option<RawOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<PlanDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_after: Option<RawOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<PlanDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<u32>,
}

/// Validated work item. Dates live in the schedule zone.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub kind: WorkKind,
    pub title: String,
    /// Topic name; resolved to an id at execution time. Empty means none.
    pub topic: String,
    pub publish_offset: DateOffset,
    pub publish_date: Option<DateTime<Tz>>,
    pub description: Option<String>,
    pub files: Vec<String>,
    pub due_offset: Option<DateOffset>,
    pub due_date: Option<DateTime<Tz>>,
    pub max_points: Option<u32>,
}

/// Turn a raw item into a [`WorkItem`], interpreting naive dates in `tz`.
pub fn normalize(raw: &RawWorkItem, tz: Tz) -> Result<WorkItem, ConfigError> {
    let kind = raw
        .kind
        .trim()
        .parse::<WorkKind>()
        .map_err(|_| ConfigError::UnknownKind {
            item: raw.name.clone(),
            value: raw.kind.clone(),
        })?;

    let title = raw.name.trim();
    if title.is_empty() {
        return Err(ConfigError::EmptyTitle);
    }

    let date = |field: &'static str, value: &Option<PlanDate>| {
        value
            .as_ref()
            .map(|raw| {
                raw.resolve(tz).map_err(|reason| ConfigError::InvalidDate {
                    item: title.to_string(),
                    field,
                    value: raw.text(),
                    reason,
                })
            })
            .transpose()
    };

    Ok(WorkItem {
        kind,
        title: title.to_string(),
        topic: raw.topic.trim().to_string(),
        publish_offset: raw.publish_after.map(DateOffset::from).unwrap_or_default(),
        publish_date: date("publish_date", &raw.publish_date)?,
        description: raw.description.clone().filter(|d| !d.trim().is_empty()),
        files: raw.files.clone().unwrap_or_default(),
        due_offset: raw.due_after.map(DateOffset::from),
        due_date: date("due_date", &raw.due_date)?,
        max_points: raw.max_points,
    })
}

impl WorkItem {
    /// Publish date given the previous item's resolved publish date
    /// (the plan start for the first item).
    pub fn resolve_publish_date(
        &self,
        previous: &DateTime<Tz>,
    ) -> Result<DateTime<Tz>, DateOutOfRange> {
        match &self.publish_date {
            Some(date) => Ok(*date),
            None => self.publish_offset.apply(previous),
        }
    }

    /// Due date relative to this item's resolved publish date.
    ///
    /// Always `None` for materials, whatever the due fields say.
    pub fn resolve_due_date(
        &self,
        publish: &DateTime<Tz>,
    ) -> Result<Option<DateTime<Tz>>, DateOutOfRange> {
        if self.kind == WorkKind::Material {
            return Ok(None);
        }
        if let Some(date) = &self.due_date {
            return Ok(Some(*date));
        }
        self.due_offset
            .map(|offset| offset.apply(publish))
            .transpose()
    }

    /// Render back to plan-source form with absolute dates in RFC 3339.
    pub fn to_raw(&self) -> RawWorkItem {
        RawWorkItem {
            kind: self.kind.as_str().to_string(),
            name: self.title.clone(),
            topic: self.topic.clone(),
            publish_after: Some(self.publish_offset.into()),
            publish_date: self.publish_date.as_ref().map(|d| to_fixed(d).to_rfc3339().into()),
            description: self.description.clone(),
            files: (!self.files.is_empty()).then(|| self.files.clone()),
            due_after: self.due_offset.map(RawOffset::from),
            due_date: self.due_date.as_ref().map(|d| to_fixed(d).to_rfc3339().into()),
            max_points: self.max_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use chrono_tz::America::New_York;

    fn raw(kind: &str) -> RawWorkItem {
        RawWorkItem {
            kind: kind.to_string(),
            name: "Week 1 reading".to_string(),
            topic: "Unit 1".to_string(),
            publish_after: None,
            publish_date: None,
            description: None,
            files: None,
            due_after: None,
            due_date: None,
            max_points: None,
        }
    }

    #[test]
    fn unknown_kind_is_a_config_error() {
        let err = normalize(&raw("quiz"), New_York).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKind { ref value, .. } if value == "quiz"));
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut r = raw("material");
        r.name = "   ".to_string();
        assert!(matches!(normalize(&r, New_York), Err(ConfigError::EmptyTitle)));
    }

    #[test]
    fn offsets_accept_pairs_and_mappings() {
        let json = r#"{
            "kind": "assignment",
            "name": "HW1",
            "topic": "Unit 1",
            "publish_after": [1, 2],
            "due_after": {"days": 5}
        }"#;
        let r: RawWorkItem = serde_json::from_str(json).unwrap();
        let item = normalize(&r, New_York).unwrap();
        assert_eq!(item.publish_offset, DateOffset::new(1, 2));
        assert_eq!(item.due_offset, Some(DateOffset::new(0, 5)));
    }

    #[test]
    fn offset_mapping_rejects_unknown_keys() {
        let json = r#"{"kind": "material", "name": "x", "publish_after": {"months": 1}}"#;
        assert!(serde_json::from_str::<RawWorkItem>(json).is_err());
    }

    #[test]
    fn negative_offsets_do_not_parse() {
        let json = r#"{"kind": "material", "name": "x", "publish_after": {"days": -1}}"#;
        assert!(serde_json::from_str::<RawWorkItem>(json).is_err());
    }

    #[test]
    fn bad_date_names_the_field() {
        let mut r = raw("assignment");
        r.due_date = Some("soon".into());
        let err = normalize(&r, New_York).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { field: "due_date", .. }));
    }

    #[test]
    fn publish_offset_keeps_time_of_day() {
        let mut r = raw("material");
        r.publish_after = Some(RawOffset::Pair(1, 3));
        let item = normalize(&r, New_York).unwrap();

        let prev = New_York.with_ymd_and_hms(2025, 6, 1, 14, 45, 0).unwrap();
        let out = item.resolve_publish_date(&prev).unwrap();
        assert_eq!(out.date_naive().to_string(), "2025-06-11");
        assert_eq!((out.hour(), out.minute()), (14, 45));
    }

    #[test]
    fn absolute_publish_date_wins() {
        let mut r = raw("material");
        r.publish_after = Some(RawOffset::Pair(4, 0));
        r.publish_date = Some("2025-09-01T08:00".into());
        let item = normalize(&r, New_York).unwrap();

        let prev = New_York.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let out = item.resolve_publish_date(&prev).unwrap();
        assert_eq!(out, New_York.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn material_never_has_a_due_date() {
        let mut r = raw("material");
        r.due_after = Some(RawOffset::Pair(0, 5));
        r.due_date = Some("2025-07-01".into());
        let item = normalize(&r, New_York).unwrap();

        let publish = New_York.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(item.resolve_due_date(&publish).unwrap(), None);
    }

    #[test]
    fn assignment_due_date_precedence() {
        let publish = New_York.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        let mut r = raw("assignment");
        r.due_after = Some(RawOffset::Pair(0, 5));
        let relative = normalize(&r, New_York).unwrap();
        assert_eq!(
            relative.resolve_due_date(&publish).unwrap(),
            Some(New_York.with_ymd_and_hms(2025, 6, 6, 9, 0, 0).unwrap())
        );

        r.due_date = Some("2025-06-03T23:59".into());
        let absolute = normalize(&r, New_York).unwrap();
        assert_eq!(
            absolute.resolve_due_date(&publish).unwrap(),
            Some(New_York.with_ymd_and_hms(2025, 6, 3, 23, 59, 0).unwrap())
        );

        let bare = normalize(&raw("assignment"), New_York).unwrap();
        assert_eq!(bare.resolve_due_date(&publish).unwrap(), None);
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let mut r = raw("assignment");
        r.publish_after = Some(RawOffset::Fields(OffsetFields { weeks: 1, days: 0 }));
        r.due_date = Some("2025-06-20 17:00".into());
        r.files = Some(vec!["hw1.pdf".to_string()]);
        r.description = Some("Problems 1-10".to_string());
        r.max_points = Some(50);

        let once = normalize(&r, New_York).unwrap();
        let twice = normalize(&once.to_raw(), New_York).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn title_alias_is_accepted() {
        let json = r#"{"kind": "material", "title": "Syllabus", "unknown": true}"#;
        let r: RawWorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(normalize(&r, New_York).unwrap().title, "Syllabus");
    }
}
