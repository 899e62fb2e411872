use chrono::NaiveDate;

use crate::errors::{Error, Result};
use crate::utils::period::Period;

/// Obligations may be edited for the current month and the next one only.
pub fn is_within_edit_window(period: &Period, today: NaiveDate) -> bool {
    let current = Period::from_date(today);
    *period == current || *period == current.next()
}

pub fn ensure_editable(period: &Period, today: NaiveDate) -> Result<()> {
    if is_within_edit_window(period, today) {
        Ok(())
    } else {
        let current = Period::from_date(today);
        Err(Error::Forbidden(format!(
            "Obligations of {} can no longer be edited; only {} and {} are open",
            period,
            current,
            current.next()
        )))
    }
}
