//! STD subscribers: phone numbers whose long-distance (STD) calls add up to at
//! least an hour.
//!
//! Input lines are Call Data Records:
//!
//! ```text
//! fromPhoneNumber|toPhoneNumber|yyyy-MM-dd HH:mm:ss|yyyy-MM-dd HH:mm:ss|stdFlag
//! ```
//!
//! Output is `fromPhoneNumber<TAB>totalSTDMinutes` for every number at or above
//! [`STD_MINUTES_THRESHOLD`].

use crate::engine::{Combiner, Emitter, Job, Mapper, Reducer, Values};
use crate::record::{split_fields, RecordError};
use chrono::NaiveDateTime;

pub const JOB_NAME: &str = "STD Subscribers";

/// Minimum total STD minutes for a number to be reported.
pub const STD_MINUTES_THRESHOLD: i64 = 60;

/// Timestamp layout of the call start and end fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// Field positions in a CDR line.
pub struct CdrField;

impl CdrField {
    pub const FROM_PHONE_NUMBER: usize = 0;
    pub const TO_PHONE_NUMBER: usize = 1;
    pub const CALL_START_TIME: usize = 2;
    pub const CALL_END_TIME: usize = 3;
    pub const STD_FLAG: usize = 4;

    /// Fields a CDR line must have; extra trailing fields are ignored.
    pub const COUNT: usize = 5;
}

/// One parsed Call Data Record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub from_number: String,
    pub to_number: String,
    pub call_start: NaiveDateTime,
    pub call_end: NaiveDateTime,
    pub is_std: bool,
}

impl CallRecord {
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        Self::from_fields(&split_fields(line))
    }

    pub fn from_fields(fields: &[&str]) -> Result<Self, RecordError> {
        check_field_count(fields)?;
        Ok(Self {
            from_number: fields[CdrField::FROM_PHONE_NUMBER].to_string(),
            to_number: fields[CdrField::TO_PHONE_NUMBER].to_string(),
            call_start: parse_timestamp("call start time", fields[CdrField::CALL_START_TIME])?,
            call_end: parse_timestamp("call end time", fields[CdrField::CALL_END_TIME])?,
            is_std: is_std_flag(fields[CdrField::STD_FLAG]),
        })
    }

    /// Whole minutes between start and end, rounded down.
    pub fn duration_minutes(&self) -> i64 {
        let millis = (self.call_end - self.call_start).num_milliseconds();
        millis.div_euclid(MILLIS_PER_MINUTE)
    }
}

fn check_field_count(fields: &[&str]) -> Result<(), RecordError> {
    if fields.len() < CdrField::COUNT {
        return Err(RecordError::TooFewFields {
            expected: CdrField::COUNT,
            found: fields.len(),
        });
    }
    Ok(())
}

/// Parse a leading `yyyy-MM-dd HH:mm:ss`; anything after the seconds (fractions,
/// spaces, zone suffixes) is ignored.
fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, RecordError> {
    NaiveDateTime::parse_and_remainder(value, TIMESTAMP_FORMAT)
        .map(|(timestamp, _remainder)| timestamp)
        .map_err(|source| RecordError::Timestamp {
            field,
            value: value.to_string(),
            source,
        })
}

pub fn is_std_flag(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("1")
}

/// Emits `(fromPhoneNumber, minutes)` for each STD call.
///
/// Timestamps are only parsed for STD calls, so a non-STD record with broken
/// times is ignored rather than counted as malformed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallDurationMapper;

impl Mapper for CallDurationMapper {
    type Key = String;
    type Value = i64;

    fn map(&self, line: &str, emitter: &mut Emitter<String, i64>) -> Result<(), RecordError> {
        let fields = split_fields(line);
        check_field_count(&fields)?;

        if !is_std_flag(fields[CdrField::STD_FLAG]) {
            return Ok(());
        }

        let record = CallRecord::from_fields(&fields)?;
        let minutes = record.duration_minutes();
        emitter.emit(record.from_number, minutes);
        Ok(())
    }
}

fn sum_minutes(values: Values<'_, i64>) -> i64 {
    values.sum()
}

/// Adds up partial minute totals inside a map task.
///
/// The threshold is not applied here: a number may fall short in one split and
/// still qualify overall.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinutesSumCombiner;

impl Combiner<String, i64> for MinutesSumCombiner {
    fn combine(&self, _from_number: &String, values: Values<'_, i64>) -> i64 {
        sum_minutes(values)
    }
}

/// Totals a number's STD minutes and keeps it if the total reaches `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct StdMinutesReducer {
    pub threshold: i64,
}

impl Default for StdMinutesReducer {
    fn default() -> Self {
        Self {
            threshold: STD_MINUTES_THRESHOLD,
        }
    }
}

impl Reducer<String, i64> for StdMinutesReducer {
    type Output = i64;

    fn reduce(&self, _from_number: &String, values: Values<'_, i64>) -> Option<i64> {
        let total = sum_minutes(values);
        (total >= self.threshold).then_some(total)
    }
}

pub fn job() -> Job<CallDurationMapper, StdMinutesReducer> {
    Job::new(JOB_NAME, CallDurationMapper, StdMinutesReducer::default())
        .with_combiner(MinutesSumCombiner)
}
