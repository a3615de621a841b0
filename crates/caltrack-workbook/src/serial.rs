//! Excel serial dates for export (1900 date system)
//!
//! Serial 1.0 is 1900-01-01 with Excel's phantom 1900-02-29 counted, which
//! makes every serial from 61 (1900-03-01) onward a plain day count from
//! 1899-12-30. Workbooks are always written in the 1900 system; decoding,
//! including 1904-system workbooks, is left to calamine.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// `num_days_from_ce` of 1899-12-30
const EPOCH_DAYS_FROM_CE: i32 = 693_594;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial number of a calendar date
pub fn date_to_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
}

/// Serial number of a date and time of day
pub fn datetime_to_serial(datetime: NaiveDateTime) -> f64 {
    let seconds = datetime.time().num_seconds_from_midnight();
    date_to_serial(datetime.date()) + f64::from(seconds) / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn decode(serial: f64) -> NaiveDateTime {
        ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false)
            .as_datetime()
            .unwrap()
    }

    #[test]
    fn known_serials() {
        assert_eq!(date_to_serial(date(2024, 1, 10)), 45301.0);
        assert_eq!(date_to_serial(date(1900, 3, 1)), 61.0);
    }

    #[test]
    fn fractional_serial_for_time_of_day() {
        let noon = date(2024, 1, 10).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(noon), 45301.5);
    }

    #[test]
    fn serials_decode_back_through_calamine() {
        let day = date(2023, 7, 14);
        assert_eq!(decode(date_to_serial(day)), day.and_hms_opt(0, 0, 0).unwrap());

        let dt = day.and_hms_opt(8, 45, 30).unwrap();
        assert_eq!(decode(datetime_to_serial(dt)), dt);
    }
}
