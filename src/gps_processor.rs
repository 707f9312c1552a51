use anyhow::Result;
use strum_macros::EnumIter;

use crate::location::Location;

#[derive(Copy, Clone, Debug, EnumIter, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ProcessResult {
    Append = 0,
    // negative values are for ones that should never reach the route.
    OutOfOrder = -1,
    Invalid = -2,
}

impl ProcessResult {
    pub fn to_int(&self) -> i8 {
        *self as i8
    }

    pub fn of_int(i: i8) -> Result<Self> {
        match i {
            0 => Ok(ProcessResult::Append),
            -1 => Ok(ProcessResult::OutOfOrder),
            -2 => Ok(ProcessResult::Invalid),
            _ => bail!("Invalid int for `ProcessResult` {}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessResult;
    use strum::IntoEnumIterator;

    #[test]
    fn int_conversion() {
        assert_eq!(ProcessResult::Invalid.to_int(), -2);
        for result in ProcessResult::iter() {
            assert_eq!(result, ProcessResult::of_int(result.to_int()).unwrap());
        }
        assert!(ProcessResult::of_int(7).is_err());
    }
}

/// Guards the route against samples the accumulator must not see: points
/// outside the valid coordinate range and points older than the last
/// accepted one.
pub struct GpsProcessor {
    last_data: Option<Location>,
}

impl GpsProcessor {
    pub fn new() -> Self {
        GpsProcessor { last_data: None }
    }

    pub fn last_data(&self) -> Option<&Location> {
        self.last_data.as_ref()
    }

    pub fn reset(&mut self) {
        self.last_data = None;
    }

    /// Classifies `curr_data` without remembering it. Call `accept` once the
    /// point is actually part of the route.
    pub fn check(&self, curr_data: &Location) -> ProcessResult {
        if !curr_data.is_valid() {
            return ProcessResult::Invalid;
        }
        match &self.last_data {
            None => ProcessResult::Append,
            Some(last_data) => {
                // NOTE: Some platforms deliver a location from a while ago. Adding
                // it would make the route jump back and forth and count the same
                // stretch twice, so it is dropped. Equal timestamps are fine.
                if curr_data.timestamp_ms < last_data.timestamp_ms {
                    ProcessResult::OutOfOrder
                } else {
                    ProcessResult::Append
                }
            }
        }
    }

    pub fn accept(&mut self, curr_data: Location) {
        self.last_data = Some(curr_data);
    }

    pub fn preprocess(&mut self, curr_data: &Location) -> ProcessResult {
        let result = self.check(curr_data);
        if result == ProcessResult::Append {
            self.accept(*curr_data);
        }
        result
    }
}
