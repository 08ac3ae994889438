use chrono::{Local, NaiveDateTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const ID_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub fn date_stamp(at: &NaiveDateTime) -> String {
    at.format(DATE_FORMAT).to_string()
}

pub fn time_stamp(at: &NaiveDateTime) -> String {
    at.format(TIME_FORMAT).to_string()
}

pub fn id_timestamp(at: &NaiveDateTime) -> String {
    at.format(ID_TIMESTAMP_FORMAT).to_string()
}
