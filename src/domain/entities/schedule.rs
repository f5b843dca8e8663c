use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Weekly business-hours schedule with holidays.
///
/// A schedule flagged `is_24x7` short-circuits all entry/holiday logic and
/// counts every wall-clock minute as business time. Exactly one schedule per
/// tenant may be `is_default` (store-enforced).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHoursSchedule {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// IANA zone identifier, e.g. "America/New_York". An unparseable zone
    /// degrades to UTC rather than failing.
    pub timezone: String,
    pub is_24x7: bool,
    pub is_default: bool,
    pub entries: Vec<BusinessHoursEntry>,
    pub holidays: Vec<Holiday>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessHoursSchedule {
    pub fn new(tenant_id: String, name: String, timezone: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id,
            name,
            timezone,
            is_24x7: false,
            is_default: false,
            entries: Vec::new(),
            holidays: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Virtual schedule used when a target forces 24x7 coverage or when a
    /// tenant has no usable schedule configured at all.
    pub fn around_the_clock() -> Self {
        let now = Utc::now();
        Self {
            id: "24x7".to_string(),
            tenant_id: String::new(),
            name: "24x7".to_string(),
            timezone: "UTC".to_string(),
            is_24x7: true,
            is_default: false,
            entries: Vec::new(),
            holidays: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    pub fn entry_for(&self, weekday: Weekday) -> Option<&BusinessHoursEntry> {
        self.entries.iter().find(|e| e.day_of_week == weekday)
    }

    /// Exact-date match, or month/day match for annually recurring holidays.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| {
            h.date == date
                || (h.recurring && h.date.month() == date.month() && h.date.day() == date.day())
        })
    }
}

/// One day-of-week window within a schedule. Times are "HH:MM" strings;
/// malformed times mean the day is treated as closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHoursEntry {
    pub id: String,
    pub schedule_id: String,
    pub day_of_week: Weekday,
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
}

impl BusinessHoursEntry {
    pub fn new(schedule_id: String, day_of_week: Weekday, start_time: &str, end_time: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            schedule_id,
            day_of_week,
            enabled: true,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }

    pub fn start(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.start_time, "%H:%M").ok()
    }

    pub fn end(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.end_time, "%H:%M").ok()
    }
}

/// Holiday calendar entry. Recurring holidays repeat annually on the same
/// month and day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub recurring: bool,
}

impl Holiday {
    pub fn new(name: String, date: NaiveDate, recurring: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            date,
            recurring,
        }
    }
}
