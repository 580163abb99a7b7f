mod date;

pub use date::{from_millis, parse_date, to_rfc822};
