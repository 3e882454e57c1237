// Local filter engine for the bookings list.
//
// Filtering is a pure function of (source list, filters, now): no hidden
// state, no re-sorting, full recompute on every change. The lists involved
// are a few hundred rows at most, so clarity beats cleverness here.
use chrono::{DateTime, Duration, Utc};

use crate::models::{Booking, BookingStatus, TransportMode};

/// Enumerated date buckets for the list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl DateRange {
    /// Boundary date; records with `created_at >= cutoff` are in.
    /// `All` means no constraint.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            DateRange::All => return None,
            DateRange::Last7Days => 7,
            DateRange::Last30Days => 30,
            DateRange::Last90Days => 90,
        };
        Some(now - Duration::days(days))
    }
}

/// Active filter state for the bookings page. A `None` categorical filter
/// means that category is inactive.
#[derive(Debug, Clone, Default)]
pub struct BookingFilters {
    pub search: String,
    pub status: Option<BookingStatus>,
    pub mode: Option<TransportMode>,
    pub date_range: DateRange,
}

impl BookingFilters {
    /// Toggle semantics: selecting the already-active value clears the
    /// filter, anything else replaces it.
    pub fn toggle_status(&mut self, status: BookingStatus) {
        self.status = if self.status == Some(status) {
            None
        } else {
            Some(status)
        };
    }

    pub fn toggle_mode(&mut self, mode: TransportMode) {
        self.mode = if self.mode == Some(mode) {
            None
        } else {
            Some(mode)
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Derive the display list: every active filter must match (AND), with
    /// the text search matching any of its fields (OR). Stable - output
    /// preserves source order.
    pub fn apply(&self, bookings: &[Booking], now: DateTime<Utc>) -> Vec<Booking> {
        let cutoff = self.date_range.cutoff(now);
        let term = self.search.trim().to_lowercase();

        bookings
            .iter()
            .filter(|b| self.matches(b, cutoff, &term))
            .cloned()
            .collect()
    }

    fn matches(&self, booking: &Booking, cutoff: Option<DateTime<Utc>>, term: &str) -> bool {
        if !term.is_empty() && !matches_search(booking, term) {
            return false;
        }
        if let Some(status) = self.status {
            if booking.status != Some(status) {
                return false;
            }
        }
        if let Some(mode) = self.mode {
            if booking.mode != Some(mode) {
                return false;
            }
        }
        if let Some(cutoff) = cutoff {
            // Missing or malformed created_at never matches a date filter
            match booking.created_at {
                Some(created) => created >= cutoff,
                None => false,
            }
        } else {
            true
        }
    }
}

/// Case-insensitive substring match over the searchable fields.
fn matches_search(booking: &Booking, term_lower: &str) -> bool {
    booking.booking_number.to_lowercase().contains(term_lower)
        || booking.origin.to_lowercase().contains(term_lower)
        || booking.destination.to_lowercase().contains(term_lower)
        || booking.cargo_type.to_lowercase().contains(term_lower)
}
