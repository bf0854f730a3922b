use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::util::years_before;
use crate::validation::{FieldError, ValidationList};

/// A date as typed into three separate boxes.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateParts {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl DateParts {
    pub fn new(day: impl Into<String>, month: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            month: month.into(),
            year: year.into(),
        }
    }

    pub fn from_date(date: Date) -> Self {
        Self {
            day: date.day().to_string(),
            month: u8::from(date.month()).to_string(),
            year: date.year().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.day.trim().is_empty() && self.month.trim().is_empty() && self.year.trim().is_empty()
    }

    pub fn parse(&self) -> Option<Date> {
        let day: u8 = self.day.trim().parse().ok()?;
        let month: u8 = self.month.trim().parse().ok()?;
        let year: i32 = self.year.trim().parse().ok()?;
        let month = Month::try_from(month).ok()?;
        Date::from_calendar_date(year, month, day).ok()
    }

    /// Validates a date that must be real and strictly in the past.
    pub fn validate_past(
        &self,
        errors: &mut ValidationList,
        name: &'static str,
        label: &'static str,
        today: Date,
    ) {
        if self.is_blank() {
            errors.add(name, FieldError::Enter { label });
            return;
        }

        let missing_day = self.day.trim().is_empty();
        let missing_month = self.month.trim().is_empty();
        let missing_year = self.year.trim().is_empty();
        if missing_day || missing_month || missing_year {
            errors.add(
                name,
                FieldError::DateMissing {
                    label,
                    missing_day,
                    missing_month,
                    missing_year,
                },
            );
            return;
        }

        match self.parse() {
            None => errors.add(name, FieldError::DateMustBeReal { label }),
            Some(date) if date >= today => errors.add(name, FieldError::DateMustBePast { label }),
            Some(_) => {}
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DobWarning {
    AttorneyUnder18,
    Over100,
}

impl DobWarning {
    pub fn code(&self) -> &'static str {
        match self {
            Self::AttorneyUnder18 => "attorneyDateOfBirthIsUnder18",
            Self::Over100 => "dateOfBirthIsOver100",
        }
    }

    /// Advisory age warning for an attorney born on `dob`.
    pub fn for_attorney(dob: Date, today: Date) -> Option<Self> {
        if dob >= today {
            return None;
        }
        if dob > years_before(today, 18) {
            return Some(Self::AttorneyUnder18);
        }
        if dob < years_before(today, 100) {
            return Some(Self::Over100);
        }
        None
    }

    /// Donors are only warned about implausible ages.
    pub fn for_donor(dob: Date, today: Date) -> Option<Self> {
        (dob < years_before(today, 100)).then_some(Self::Over100)
    }
}
