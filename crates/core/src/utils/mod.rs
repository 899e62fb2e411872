pub mod period;
pub mod time_utils;
