//! Result rendering for the terminal

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }

    /// Print `value` as pretty JSON, or run `text` to print it for humans
    pub fn emit<T: Serialize>(self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        match self {
            Self::Json => println!("{}", serde_json::to_string_pretty(value)?),
            Self::Text => text(value),
        }
        Ok(())
    }
}
