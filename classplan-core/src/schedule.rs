//! The date chain: each item's publish date is derived from the previous
//! item's resolved publish date, starting at the plan start.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::PreconditionError;
use crate::offset::DateOutOfRange;
use crate::work::{WorkItem, WorkKind};

/// Fold state threaded through a plan in order.
#[derive(Debug, Clone)]
pub struct DateChain {
    previous: DateTime<Tz>,
}

impl DateChain {
    pub fn new(start: DateTime<Tz>) -> Self {
        Self { previous: start }
    }

    pub fn previous(&self) -> &DateTime<Tz> {
        &self.previous
    }

    /// Resolve `item`'s publish date and make it the next reference.
    pub fn advance(&mut self, item: &WorkItem) -> Result<DateTime<Tz>, DateOutOfRange> {
        let publish = item.resolve_publish_date(&self.previous)?;
        self.previous = publish;
        Ok(publish)
    }
}

/// Dates of one item as the chain resolves them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledDates {
    pub title: String,
    pub kind: WorkKind,
    pub publish: DateTime<Tz>,
    pub due: Option<DateTime<Tz>>,
}

/// Resolve every item's dates without touching any remote service.
///
/// A missing assignment due date is reported as `due: None` here; only the
/// executor treats it as fatal.
pub fn resolve_schedule(
    start: DateTime<Tz>,
    items: &[WorkItem],
) -> Result<Vec<ScheduledDates>, PreconditionError> {
    let mut chain = DateChain::new(start);
    items
        .iter()
        .map(|item| {
            let out_of_range = |source| PreconditionError::DateOutOfRange {
                item: item.title.clone(),
                source,
            };
            let publish = chain.advance(item).map_err(out_of_range)?;
            let due = item.resolve_due_date(&publish).map_err(out_of_range)?;
            Ok(ScheduledDates {
                title: item.title.clone(),
                kind: item.kind,
                publish,
                due,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::DateOffset;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn item(title: &str, kind: WorkKind, offset: DateOffset) -> WorkItem {
        WorkItem {
            kind,
            title: title.to_string(),
            topic: String::new(),
            publish_offset: offset,
            publish_date: None,
            description: None,
            files: vec![],
            due_offset: None,
            due_date: None,
            max_points: None,
        }
    }

    #[test]
    fn chain_folds_over_previous_publish_date() {
        let start = New_York.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let items = vec![
            item("a", WorkKind::Material, DateOffset::new(0, 3)),
            item("b", WorkKind::Material, DateOffset::new(1, 0)),
            item("c", WorkKind::Material, DateOffset::new(0, 0)),
        ];

        let dates: Vec<String> = resolve_schedule(start, &items)
            .unwrap()
            .iter()
            .map(|s| s.publish.date_naive().to_string())
            .collect();
        assert_eq!(dates, ["2025-06-04", "2025-06-11", "2025-06-11"]);
    }

    #[test]
    fn chain_advances_on_publish_not_due() {
        let start = New_York.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut hw = item("hw", WorkKind::Assignment, DateOffset::new(0, 1));
        hw.due_offset = Some(DateOffset::new(2, 0));
        let next = item("next", WorkKind::Material, DateOffset::new(0, 1));

        let out = resolve_schedule(start, &[hw, next]).unwrap();
        assert_eq!(out[0].due.unwrap().date_naive().to_string(), "2025-06-16");
        assert_eq!(out[1].publish.date_naive().to_string(), "2025-06-03");
    }

    #[test]
    fn absolute_date_resets_the_chain() {
        let start = New_York.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut pinned = item("pinned", WorkKind::Material, DateOffset::new(5, 0));
        pinned.publish_date = Some(New_York.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap());
        let after = item("after", WorkKind::Material, DateOffset::new(0, 2));

        let mut chain = DateChain::new(start);
        chain.advance(&pinned).unwrap();
        let publish = chain.advance(&after).unwrap();
        assert_eq!(publish.date_naive().to_string(), "2025-08-03");
        assert_eq!(chain.previous(), &publish);
    }

    #[test]
    fn preview_tolerates_missing_due_date() {
        let start = New_York.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let hw = item("hw", WorkKind::Assignment, DateOffset::ZERO);
        let out = resolve_schedule(start, &[hw]).unwrap();
        assert_eq!(out[0].due, None);
    }
}
