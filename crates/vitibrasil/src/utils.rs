use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::config::FIRST_YEAR;
use crate::types::Record;

#[derive(Debug, thiserror::Error)]
pub enum YearRangeError {
    #[error("Start year ({start}) cannot be after end year ({end})")]
    Inverted { start: i32, end: i32 },
    #[error("Year {0} is before the first published year (1970)")]
    TooEarly(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn validate(self) -> Result<Self, YearRangeError> {
        if self.start > self.end {
            return Err(YearRangeError::Inverted {
                start: self.start,
                end: self.end,
            });
        }
        if self.start < FIRST_YEAR {
            return Err(YearRangeError::TooEarly(self.start));
        }
        Ok(self)
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

#[derive(Debug, Default)]
pub struct RecordStats {
    pub per_year: BTreeMap<i64, usize>,
    pub total: usize,
}

impl RecordStats {
    pub fn from_records(records: &[Record]) -> RecordStats {
        let mut per_year = BTreeMap::new();
        for year in records.iter().filter_map(Record::year) {
            *per_year.entry(year).or_insert(0) += 1;
        }
        RecordStats {
            per_year,
            total: records.len(),
        }
    }
}

impl std::fmt::Display for RecordStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        for (year, count) in &self.per_year {
            writeln!(f, "  {year}: {count:>6} record(s)")?;
        }
        writeln!(f, "  Years with data: {}", self.per_year.len())?;
        writeln!(f, "  Total:           {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    #[test]
    fn test_validate_rejects_inverted_range() {
        let err = YearRange {
            start: 2010,
            end: 2000,
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Start year (2010) cannot be after end year (2000)"
        );
    }

    #[test]
    fn test_validate_rejects_years_before_1970() {
        assert!(matches!(
            YearRange::single(1969).validate(),
            Err(YearRangeError::TooEarly(1969))
        ));
        assert!(YearRange::single(1970).validate().is_ok());
    }

    #[test]
    fn test_stats_group_by_year() {
        let record = |year: i64| {
            let mut r = Record::new();
            r.insert("year", CellValue::Integer(year));
            r
        };
        let records = vec![record(2001), record(2001), record(2003)];
        let stats = RecordStats::from_records(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.per_year.get(&2001), Some(&2));
        assert_eq!(stats.per_year.get(&2003), Some(&1));
        assert_eq!(stats.per_year.get(&2002), None);
    }
}
