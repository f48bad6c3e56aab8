// src/pipeline/window.rs

//! Date window selection for a run.

use chrono::NaiveDate;

use crate::error::{AppError, Result};

/// Inclusive bulletin date range processed by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RunWindow {
    /// Resolve the window from command-line dates and the resume cursor.
    ///
    /// - no dates: `resume..=today`, failing when there is nothing to resume
    /// - start only: `start..=today`; a future start is rejected
    /// - start and end: `start..=end`; `start` after `end` is rejected
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        resume: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self> {
        match (start, end) {
            (None, None) => {
                let start = resume.ok_or_else(|| {
                    AppError::window("No previous date found. Please specify a start date.")
                })?;
                log::info!("Continuing from last processed date: {}", start);
                Ok(Self { start, end: today })
            }
            (Some(start), None) => {
                if start > today {
                    return Err(AppError::window("Date cannot be in the future"));
                }
                Ok(Self { start, end: today })
            }
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(AppError::window("Start date must be before end date"));
                }
                Ok(Self { start, end })
            }
            (None, Some(_)) => Err(AppError::window("An end date requires a start date")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 15)
    }

    #[test]
    fn resumes_from_cursor_to_today() {
        let window = RunWindow::resolve(None, None, Some(date(2025, 6, 1)), today()).unwrap();
        assert_eq!(window, RunWindow { start: date(2025, 6, 1), end: today() });
    }

    #[test]
    fn missing_cursor_is_an_error() {
        let err = RunWindow::resolve(None, None, None, today()).unwrap_err();
        assert!(matches!(err, AppError::Window(_)));
    }

    #[test]
    fn explicit_start_ignores_cursor() {
        let window =
            RunWindow::resolve(Some(date(2025, 1, 1)), None, Some(date(2025, 6, 1)), today()).unwrap();
        assert_eq!(window, RunWindow { start: date(2025, 1, 1), end: today() });
    }

    #[test]
    fn future_start_is_rejected() {
        assert!(RunWindow::resolve(Some(date(2025, 7, 1)), None, None, today()).is_err());
        assert!(RunWindow::resolve(Some(today()), None, None, today()).is_ok());
    }

    #[test]
    fn explicit_window_must_be_ordered() {
        let window =
            RunWindow::resolve(Some(date(2025, 1, 1)), Some(date(2025, 1, 1)), None, today()).unwrap();
        assert_eq!(window.start, window.end);

        let err = RunWindow::resolve(Some(date(2025, 2, 1)), Some(date(2025, 1, 1)), None, today())
            .unwrap_err();
        assert!(matches!(err, AppError::Window(_)));
    }

    #[test]
    fn end_without_start_is_rejected() {
        assert!(RunWindow::resolve(None, Some(date(2025, 1, 1)), Some(date(2024, 1, 1)), today()).is_err());
    }
}
