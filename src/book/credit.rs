use serde::{Deserialize, Serialize};
use std::fmt;

/// Someone who contributed to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub name: String,
    /// e.g. "proofreader", "validator"
    #[serde(default)]
    pub roles: Vec<String>,
    /// Number of contributions, used to order the credits page
    #[serde(default)]
    pub count: usize,
}

impl Credit {
    pub fn new<S: ToString>(name: S) -> Credit {
        Credit {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl From<&str> for Credit {
    fn from(name: &str) -> Self {
        Credit::new(name)
    }
}

impl fmt::Display for Credit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.roles.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.roles.join(", "))
        }
    }
}
