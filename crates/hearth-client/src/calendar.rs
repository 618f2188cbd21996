use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// One month of the family calendar, laid out Sunday-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    year: i32,
    /// 1-based
    month: u32,
}

impl MonthView {
    /// Month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// `None` unless `month` is 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::containing)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn title(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Empty cells before the 1st (0 when the month starts on Sunday).
    pub fn leading_blanks(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first_day();
        next.signed_duration_since(self.first_day()).num_days() as u32
    }

    /// Grid cells in display order: `None` for leading blanks, then the
    /// day numbers.
    pub fn cells(&self) -> Vec<Option<u32>> {
        let blanks = (0..self.leading_blanks()).map(|_| None);
        let days = (1..=self.days_in_month()).map(Some);
        blanks.chain(days).collect()
    }

    /// Day of this month that is `today`, if today falls in it.
    pub fn today_marker(&self, today: NaiveDate) -> Option<u32> {
        (today.year() == self.year && today.month() == self.month).then(|| today.day())
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("title and date are both required")]
    Incomplete,

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    BadDate(String),
}

/// A calendar entry. Entries are not stored anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEvent {
    pub title: String,
    pub date: NaiveDate,
}

impl PlannedEvent {
    /// Validate form input: both fields required, date as `YYYY-MM-DD`.
    pub fn parse(title: &str, date: &str) -> Result<Self, EventError> {
        let (title, date) = (title.trim(), date.trim());
        if title.is_empty() || date.is_empty() {
            return Err(EventError::Incomplete);
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| EventError::BadDate(date.to_string()))?;
        Ok(Self {
            title: title.to_string(),
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn october_2026_layout() {
        // 2026-10-01 is a Thursday
        let view = MonthView::new(2026, 10).unwrap();
        assert_eq!(view.leading_blanks(), 4);
        assert_eq!(view.days_in_month(), 31);

        let cells = view.cells();
        assert_eq!(cells.len(), 35);
        assert_eq!(cells[3], None);
        assert_eq!(cells[4], Some(1));
        assert_eq!(cells[34], Some(31));
    }

    #[test]
    fn february_lengths() {
        assert_eq!(MonthView::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthView::new(2026, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthView::new(2026, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn navigation_rolls_over_years() {
        let dec = MonthView::new(2026, 12).unwrap();
        assert_eq!(dec.next(), MonthView::new(2027, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(MonthView::new(2026, 1).unwrap().prev().title(), "2025-12");
        assert!(MonthView::new(2026, 13).is_none());
    }

    #[test]
    fn today_is_marked_only_in_its_month() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let view = MonthView::containing(today);
        assert_eq!(view.today_marker(today), Some(18));
        assert_eq!(view.next().today_marker(today), None);
    }

    #[test]
    fn planned_event_validation() {
        let event = PlannedEvent::parse(" Picnic ", "2026-10-24").unwrap();
        assert_eq!(event.title, "Picnic");
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2026, 10, 24).unwrap());

        assert_eq!(PlannedEvent::parse("", "2026-10-24"), Err(EventError::Incomplete));
        assert_eq!(PlannedEvent::parse("Picnic", ""), Err(EventError::Incomplete));
        assert!(matches!(PlannedEvent::parse("Picnic", "24/10/2026"), Err(EventError::BadDate(_))));
    }
}
