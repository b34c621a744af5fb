//! Polling policy for the command engines.
//!
//! The debug module reports completion asynchronously, so every engine waits
//! by re-reading a status register. The number of status reads is bounded by
//! a [`PollPolicy`]; running out of polls is reported as
//! [`DmiError::Timeout`](crate::DmiError::Timeout) or
//! [`DmiError::SystemBusTimeout`](crate::DmiError::SystemBusTimeout).

use serde::{Deserialize, Serialize};

/// Default number of status reads before a poll loop gives up.
pub const DEFAULT_MAX_POLLS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Maximum number of status register reads. Zero is treated as one.
    pub max_polls: u32,
}

impl PollPolicy {
    pub const fn new(max_polls: u32) -> Self {
        Self { max_polls }
    }

    /// The number of reads a poll loop actually performs.
    pub fn polls(&self) -> u32 {
        self.max_polls.max(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POLLS)
    }
}

/// Poll bounds of the abstract command, system bus and hart control engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmiConfig {
    pub abstract_command: PollPolicy,
    pub system_bus: PollPolicy,
    pub hart_control: PollPolicy,
}

impl DmiConfig {
    /// Use the same bound for every engine.
    pub fn uniform(max_polls: u32) -> Self {
        let policy = PollPolicy::new(max_polls);

        Self {
            abstract_command: policy,
            system_bus: policy,
            hart_control: policy,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{DmiConfig, PollPolicy, DEFAULT_MAX_POLLS};
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_entries_use_defaults() {
        let config: DmiConfig =
            serde_json::from_str(r#"{ "system_bus": { "max_polls": 5 } }"#).unwrap();

        assert_eq!(
            config,
            DmiConfig {
                abstract_command: PollPolicy::default(),
                system_bus: PollPolicy::new(5),
                hart_control: PollPolicy::new(DEFAULT_MAX_POLLS),
            }
        );
    }

    #[test]
    fn zero_polls_still_polls_once() {
        assert_eq!(PollPolicy::new(0).polls(), 1);
        assert_eq!(DmiConfig::uniform(7).hart_control.polls(), 7);
    }
}
