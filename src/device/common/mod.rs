// Common utilities for device backends: kernel file probing and rate counters.

pub mod probe;
pub mod rate_counter;

pub use probe::{parse_float, parse_number, probe_first, SysfsRoot};
pub use rate_counter::{Clock, RateCounter, SystemClock};
