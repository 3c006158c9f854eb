//! The shared `from`/`to` query parameters for range queries.

use serde::Deserialize;
use time::Date;

use crate::Error;

/// An inclusive date range taken from the query string.
#[derive(Clone, Copy, Debug, Deserialize)]
pub(crate) struct DateRangeParams {
    from: Date,
    to: Date,
}

impl DateRangeParams {
    /// Unpack the range as `(from, to)`.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `from` is after `to`.
    pub(crate) fn into_ordered_dates(self) -> Result<(Date, Date), Error> {
        if self.from > self.to {
            return Err(Error::InvalidDateRange {
                from: self.from,
                to: self.to,
            });
        }

        Ok((self.from, self.to))
    }
}
