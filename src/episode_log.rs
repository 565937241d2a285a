//! Human-readable per-agent trace, split into periods (one per step).
//!
//! The log is introspection only; no learning rule ever reads it back.
//! Closing a period yields a [`PeriodEvent`] that the driving loop hands
//! to its observers, so the log itself knows nothing about who displays it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::identifiers::AgentId;

const SEPARATOR: &str = "------------------------------------------------------------";
const PERIOD_SEPARATOR: &str = "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx";

/// Default number of periods kept per agent.
pub const DEFAULT_RETENTION: usize = 500;

/// Emitted when an agent's log rolls over to a new period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEvent {
    pub agent: AgentId,
    /// Number of the period that was just closed.
    pub period: usize,
    /// Full text of the closed period.
    pub text: String,
}

/// Append-only trace for one agent.
#[derive(Debug, Clone)]
pub struct EpisodeLog {
    agent: AgentId,
    label: String,
    periods: VecDeque<String>,
    period: usize,
    retention: usize,
}

impl EpisodeLog {
    /// Start a log whose period headers name `agent` and its strategy `label`.
    pub fn new(agent: AgentId, label: impl Into<String>) -> Self {
        let label = label.into();
        let mut periods = VecDeque::new();
        periods.push_back(format!("Ant: {agent}, strategy: {label}\n"));
        Self {
            agent,
            label,
            periods,
            period: 0,
            retention: DEFAULT_RETENTION,
        }
    }

    /// Keep at most `periods` periods, dropping the oldest first.
    pub fn with_retention(mut self, periods: usize) -> Self {
        self.retention = periods.max(1);
        self.trim();
        self
    }

    /// Append an entry to the current period.
    pub fn add(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if let Some(current) = self.periods.back_mut() {
            current.push_str(SEPARATOR);
            current.push('\n');
            current.push_str(text);
            if !text.ends_with('\n') {
                current.push('\n');
            }
        }
    }

    /// Close the current period and open the next one.
    pub fn advance_period(&mut self) -> PeriodEvent {
        let text = self.periods.back().cloned().unwrap_or_default();
        let event = PeriodEvent {
            agent: self.agent,
            period: self.period,
            text,
        };

        self.period += 1;
        self.periods.push_back(format!(
            "{PERIOD_SEPARATOR}\nAnt: {}, strategy: {}, step: {}\n",
            self.agent, self.label, self.period
        ));
        self.trim();
        event
    }

    fn trim(&mut self) {
        while self.periods.len() > self.retention {
            self.periods.pop_front();
        }
    }

    /// Number of the period currently being written.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Text of the open period.
    pub fn current(&self) -> &str {
        self.periods.back().map(String::as_str).unwrap_or_default()
    }

    /// Text of the most recently closed period, if one is still retained.
    pub fn latest_closed(&self) -> Option<&str> {
        let len = self.periods.len();
        if len < 2 {
            return None;
        }
        self.periods.get(len - 2).map(String::as_str)
    }

    /// Every retained period, oldest first.
    pub fn full_text(&self) -> String {
        self.periods.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_accumulate_in_current_period() {
        let mut log = EpisodeLog::new(AgentId::new(1), "Q-Learning");
        log.add("first");
        log.add("second\n");

        let current = log.current();
        assert!(current.starts_with("Ant: 001, strategy: Q-Learning"));
        assert!(current.contains("first\n"));
        assert!(current.contains("second\n"));
        assert_eq!(log.period(), 0);
        assert!(log.latest_closed().is_none());
    }

    #[test]
    fn test_advance_period_emits_closed_text() {
        let mut log = EpisodeLog::new(AgentId::new(3), "odor");
        log.add("moved up");

        let event = log.advance_period();
        assert_eq!(event.agent, AgentId::new(3));
        assert_eq!(event.period, 0);
        assert!(event.text.contains("moved up"));

        assert_eq!(log.period(), 1);
        assert!(log.current().contains("step: 1"));
        assert!(!log.current().contains("moved up"));
        assert_eq!(log.latest_closed(), Some(event.text.as_str()));
    }

    #[test]
    fn test_full_text_concatenates_periods() {
        let mut log = EpisodeLog::new(AgentId::new(1), "random");
        log.add("a");
        log.advance_period();
        log.add("b");

        let text = log.full_text();
        let a = text.find("a\n").unwrap();
        let b = text.find("b\n").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_retention_drops_oldest() {
        let mut log = EpisodeLog::new(AgentId::new(1), "random").with_retention(2);
        log.add("oldest");
        log.advance_period();
        log.add("middle");
        log.advance_period();
        log.add("newest");

        let text = log.full_text();
        assert!(!text.contains("oldest"));
        assert!(text.contains("middle"));
        assert!(text.contains("newest"));
        assert_eq!(log.period(), 2);
    }
}
