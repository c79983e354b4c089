//! Price-data access port trait.

use crate::domain::error::SmacrossError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;

pub trait DataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<OhlcvBar>, SmacrossError>;

    fn list_symbols(&self) -> Result<Vec<String>, SmacrossError>;

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, SmacrossError>;
}
