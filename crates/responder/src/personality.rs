//! Mode-specific system prompts, loadable from YAML.

use std::path::Path;

use anyhow::{bail, Context, Result};
use modbot_core::ResponseMode;
use serde::{Deserialize, Serialize};

/// The bot's voice: one system prompt per [`ResponseMode`].
///
/// YAML shape:
///
/// ```yaml
/// fast: "You are ..."
/// standard: "You are ..."
/// deep: "You are ..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub fast: String,
    pub standard: String,
    pub deep: String,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            fast: "You are the community helper bot for a game mod. Reply in one or two short, \
                   friendly sentences. For account linking, point users to the verification \
                   command. For navigation, name the channel they need."
                .to_string(),
            standard: "You are the community helper bot for a game mod. Answer clearly in a short \
                       paragraph. If you are not sure about a mod-specific detail, say so instead \
                       of guessing."
                .to_string(),
            deep: "You are the community helper bot for a game mod. Answer using the numbered \
                   documentation excerpts provided before the question. Prefer the excerpts over \
                   general knowledge, cite excerpt numbers like [1] where useful, and say when \
                   the excerpts do not cover the question."
                .to_string(),
        }
    }
}

impl Personality {
    /// Parses and validates a YAML personality.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let personality: Personality =
            serde_yaml::from_str(yaml).context("invalid personality YAML")?;
        personality.validate()?;
        Ok(personality)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read personality file {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Every prompt must be non-empty after trimming.
    pub fn validate(&self) -> Result<()> {
        for mode in [ResponseMode::Fast, ResponseMode::Standard, ResponseMode::Deep] {
            if self.system_prompt(mode).trim().is_empty() {
                bail!("personality prompt for {mode} mode is empty");
            }
        }
        Ok(())
    }

    pub fn system_prompt(&self, mode: ResponseMode) -> &str {
        match mode {
            ResponseMode::Fast => &self.fast,
            ResponseMode::Standard => &self.standard,
            ResponseMode::Deep => &self.deep,
        }
    }
}
