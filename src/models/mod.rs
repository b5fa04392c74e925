use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub mod activity;
pub mod event;
pub mod member;
pub mod semester;
pub mod settings;

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A calendar date, stored and transported as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateScalar(#[serde(with = "date_format")] pub Date);

#[Scalar]
impl ScalarType for DateScalar {
    fn parse(value: Value) -> InputValueResult<Self> {
        if let Value::String(date_str) = &value {
            if let Ok(date) = Date::parse(date_str, DATE_FORMAT) {
                return Ok(DateScalar(date));
            }
        }

        Err(InputValueError::expected_type(value))
    }

    fn to_value(&self) -> Value {
        match self.0.format(DATE_FORMAT) {
            Ok(formatted) => Value::String(formatted),
            Err(_) => Value::Null,
        }
    }
}

/// A point in time, stored and transported as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateTimeScalar(#[serde(with = "time::serde::rfc3339")] pub OffsetDateTime);

#[Scalar]
impl ScalarType for DateTimeScalar {
    fn parse(value: Value) -> InputValueResult<Self> {
        if let Value::String(datetime_str) = &value {
            if let Ok(datetime) = OffsetDateTime::parse(datetime_str, &Rfc3339) {
                return Ok(DateTimeScalar(datetime));
            }
        }

        Err(InputValueError::expected_type(value))
    }

    fn to_value(&self) -> Value {
        match self.0.format(&Rfc3339) {
            Ok(formatted) => Value::String(formatted),
            Err(_) => Value::Null,
        }
    }
}

impl From<OffsetDateTime> for DateTimeScalar {
    fn from(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }
}

mod date_format {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = date
            .format(DATE_FORMAT)
            .map_err(|err| serde::ser::Error::custom(err.to_string()))?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let date_str = String::deserialize(deserializer)?;
        Date::parse(&date_str, DATE_FORMAT).map_err(|err| D::Error::custom(err.to_string()))
    }
}
