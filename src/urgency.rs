use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use std::fmt;

/// How soon an intention is due, most urgent first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    Today,
    ThisWeek,
    ThisMonth,
    Later,
    Life,
}

impl Urgency {
    pub const ALL: [Urgency; 6] = [
        Urgency::Overdue,
        Urgency::Today,
        Urgency::ThisWeek,
        Urgency::ThisMonth,
        Urgency::Later,
        Urgency::Life,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::Today => "today",
            Urgency::ThisWeek => "this_week",
            Urgency::ThisMonth => "this_month",
            Urgency::Later => "later",
            Urgency::Life => "life",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const THIS_WEEK_DAYS: i64 = 7;
pub const THIS_MONTH_DAYS: i64 = 30;

/// Buckets an intention by its due date relative to `today`.
///
/// Life goals are always `Life`, and anything without a due date is `Later`.
pub fn classify_urgency(due_date: Option<NaiveDate>, is_life_goal: bool, today: NaiveDate) -> Urgency {
    if is_life_goal {
        return Urgency::Life;
    }

    let due_date = match due_date {
        Some(d) => d,
        None => return Urgency::Later,
    };

    match (due_date - today).num_days() {
        days if days < 0 => Urgency::Overdue,
        0 => Urgency::Today,
        days if days <= THIS_WEEK_DAYS => Urgency::ThisWeek,
        days if days <= THIS_MONTH_DAYS => Urgency::ThisMonth,
        _ => Urgency::Later,
    }
}

/// Groups items into every urgency bucket in display order, keeping the
/// input order inside each bucket. Empty buckets are included.
pub fn group_by_urgency<T, F>(items: impl IntoIterator<Item = T>, urgency_of: F) -> Vec<(Urgency, Vec<T>)>
where
    F: Fn(&T) -> Urgency,
{
    let mut groups: Vec<(Urgency, Vec<T>)> = Urgency::ALL.iter().map(|u| (*u, vec![])).collect();

    for item in items {
        let urgency = urgency_of(&item);
        if let Some((_, bucket)) = groups.iter_mut().find(|(u, _)| *u == urgency) {
            bucket.push(item);
        }
    }

    groups
}
