//! Identifier types for agents and food sources.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier of an agent within its population.
///
/// Displayed zero-padded to three digits (`001`, `002`, ...), the name the
/// log viewer uses to select an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| Error::AgentNotFound { id: s.to_string() })
    }
}

impl From<u32> for AgentId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Identifier of a food source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FoodId(u32);

impl FoodId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "food-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_display_is_padded() {
        assert_eq!(AgentId::new(1).to_string(), "001");
        assert_eq!(AgentId::new(42).to_string(), "042");
        assert_eq!(AgentId::new(1234).to_string(), "1234");
    }

    #[test]
    fn test_agent_id_parse() {
        assert_eq!("007".parse::<AgentId>().unwrap(), AgentId::new(7));
        assert!("ant".parse::<AgentId>().is_err());
    }
}
