//! Attendance cutoff policy.
//!
//! A session's attendance may be marked freely until the cutoff instant: the
//! configured cutoff time on the calendar day after the session date. From
//! that instant on, a status change needs an explicit delayed-payment
//! acknowledgment, and a record already marked present cannot be changed at
//! all.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// What should happen to a requested attendance status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkDecision {
    /// Before the cutoff: the change applies immediately.
    Apply,
    /// After the cutoff with an acknowledgment supplied: the change applies
    /// and the acknowledgment instant is recorded.
    ApplyDelayed,
    /// After the cutoff without an acknowledgment: the change must not
    /// persist and the caller is prompted to confirm delayed payment.
    ConfirmationRequired,
    /// After the cutoff on a record already marked present: no change is
    /// permitted.
    Locked,
}

/// Cutoff policy parameterized by the daily cutoff time.
#[derive(Debug, Clone, Copy)]
pub struct CutoffPolicy {
    cutoff_time: NaiveTime,
}

impl CutoffPolicy {
    pub fn new(cutoff_time: NaiveTime) -> Self {
        Self { cutoff_time }
    }

    /// The instant after which marking this session's attendance requires a
    /// delayed-payment acknowledgment: the first cutoff time on the day
    /// following the session date.
    pub fn cutoff_instant(&self, session_date: NaiveDate) -> NaiveDateTime {
        session_date.succ_opt().unwrap_or(NaiveDate::MAX).and_time(self.cutoff_time)
    }

    /// True iff `now` is strictly earlier than the cutoff instant.
    pub fn is_before_cutoff(&self, session_date: NaiveDate, now: NaiveDateTime) -> bool {
        now < self.cutoff_instant(session_date)
    }

    /// Decide the fate of a status change request.
    ///
    /// `current_attended` is the stored status (None = unmarked) and
    /// `delayed_confirmed` whether the caller supplied the delayed-payment
    /// acknowledgment. A record already marked present is locked once the
    /// cutoff has passed, regardless of the acknowledgment.
    pub fn evaluate_mark(
        &self,
        session_date: NaiveDate,
        now: NaiveDateTime,
        current_attended: Option<bool>,
        delayed_confirmed: bool,
    ) -> MarkDecision {
        if self.is_before_cutoff(session_date, now) {
            MarkDecision::Apply
        } else if current_attended == Some(true) {
            MarkDecision::Locked
        } else if delayed_confirmed {
            MarkDecision::ApplyDelayed
        } else {
            MarkDecision::ConfirmationRequired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_cutoff_time;

    fn policy() -> CutoffPolicy {
        CutoffPolicy::new(default_cutoff_time())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn test_cutoff_is_next_morning() {
        let session = date(2025, 3, 10);
        assert_eq!(policy().cutoff_instant(session), at(date(2025, 3, 11), 9, 0));
    }

    #[test]
    fn test_before_cutoff_applies_without_confirmation() {
        let session = date(2025, 3, 10);

        // Evening of the session day
        let now = at(date(2025, 3, 10), 18, 30);
        assert_eq!(policy().evaluate_mark(session, now, None, false), MarkDecision::Apply);

        // Next morning, one minute before the cutoff
        let now = at(date(2025, 3, 11), 8, 59);
        assert_eq!(policy().evaluate_mark(session, now, Some(false), false), MarkDecision::Apply);
    }

    #[test]
    fn test_at_cutoff_instant_counts_as_after() {
        let session = date(2025, 3, 10);
        let now = at(date(2025, 3, 11), 9, 0);
        assert!(!policy().is_before_cutoff(session, now));
        assert_eq!(
            policy().evaluate_mark(session, now, None, false),
            MarkDecision::ConfirmationRequired
        );
    }

    #[test]
    fn test_after_cutoff_requires_confirmation() {
        let session = date(2025, 3, 10);
        let now = at(date(2025, 3, 12), 10, 0);

        assert_eq!(
            policy().evaluate_mark(session, now, None, false),
            MarkDecision::ConfirmationRequired
        );
        assert_eq!(policy().evaluate_mark(session, now, None, true), MarkDecision::ApplyDelayed);
        assert_eq!(
            policy().evaluate_mark(session, now, Some(false), true),
            MarkDecision::ApplyDelayed
        );
    }

    #[test]
    fn test_present_record_locked_after_cutoff() {
        let session = date(2025, 3, 10);
        let now = at(date(2025, 3, 12), 10, 0);

        assert_eq!(policy().evaluate_mark(session, now, Some(true), false), MarkDecision::Locked);
        // Acknowledgment does not unlock a present record
        assert_eq!(policy().evaluate_mark(session, now, Some(true), true), MarkDecision::Locked);
    }

    #[test]
    fn test_present_record_still_editable_before_cutoff() {
        let session = date(2025, 3, 10);
        let now = at(date(2025, 3, 10), 20, 0);
        assert_eq!(policy().evaluate_mark(session, now, Some(true), false), MarkDecision::Apply);
    }

    #[test]
    fn test_configurable_cutoff_time() {
        let policy = CutoffPolicy::new(NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        let session = date(2025, 3, 10);

        assert!(policy.is_before_cutoff(session, at(date(2025, 3, 11), 13, 59)));
        assert!(!policy.is_before_cutoff(session, at(date(2025, 3, 11), 14, 0)));
    }
}
