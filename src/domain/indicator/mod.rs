//! Indicator engine over a [`PriceTable`](crate::domain::price_table::PriceTable).
//!
//! Every function reads only the raw price columns (tagged
//! [`ColumnKind::Raw`](crate::domain::price_table::ColumnKind::Raw)) and returns a new table; the input is never touched.
//!
//! - [`add_moving_average`]: simple moving averages for one or more periods
//! - [`add_52w_high_low`]: trailing 252-sample rolling high and low
//! - [`calculate_rsi`]: Wilder RSI(14), one column per raw symbol

pub mod high_low;
pub mod moving_average;
pub mod rsi;

pub use high_low::add_52w_high_low;
pub use moving_average::add_moving_average;
pub use rsi::{RSI_PERIOD, calculate_rsi, wilder_rsi};

/// One or more moving-average periods. A single period converts into a
/// one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Periods(Vec<usize>);

impl Periods {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<usize> for Periods {
    fn from(period: usize) -> Self {
        Periods(vec![period])
    }
}

impl From<Vec<usize>> for Periods {
    fn from(periods: Vec<usize>) -> Self {
        Periods(periods)
    }
}

impl From<&[usize]> for Periods {
    fn from(periods: &[usize]) -> Self {
        Periods(periods.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Periods {
    fn from(periods: [usize; N]) -> Self {
        Periods(periods.to_vec())
    }
}
