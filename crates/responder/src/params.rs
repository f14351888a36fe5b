//! Per-mode sampling parameter bundles.

use llm_client::GenerateOptions;
use modbot_core::ResponseMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

/// Fixed parameter bundle per mode plus the settings shared by all modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub fast: ModeParams,
    pub standard: ModeParams,
    pub deep: ModeParams,
    pub repeat_penalty: f32,
    /// Context window in tokens.
    pub num_ctx: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            fast: ModeParams {
                max_tokens: 150,
                temperature: 0.7,
                top_k: 40,
                top_p: 0.9,
            },
            standard: ModeParams {
                max_tokens: 400,
                temperature: 0.6,
                top_k: 40,
                top_p: 0.9,
            },
            deep: ModeParams {
                max_tokens: 800,
                temperature: 0.4,
                top_k: 30,
                top_p: 0.85,
            },
            repeat_penalty: 1.1,
            num_ctx: 4096,
        }
    }
}

impl GenerationParams {
    pub fn for_mode(&self, mode: ResponseMode) -> ModeParams {
        match mode {
            ResponseMode::Fast => self.fast,
            ResponseMode::Standard => self.standard,
            ResponseMode::Deep => self.deep,
        }
    }

    /// Backend `options` for `mode`.
    pub fn options(&self, mode: ResponseMode) -> GenerateOptions {
        let p = self.for_mode(mode);
        GenerateOptions {
            temperature: p.temperature,
            num_predict: p.max_tokens,
            top_k: p.top_k,
            top_p: p.top_p,
            repeat_penalty: self.repeat_penalty,
            num_ctx: self.num_ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deeper_modes_get_longer_and_cooler_generations() {
        let params = GenerationParams::default();
        assert!(params.fast.max_tokens < params.standard.max_tokens);
        assert!(params.standard.max_tokens < params.deep.max_tokens);
        assert!(params.deep.temperature < params.fast.temperature);
    }

    #[test]
    fn options_carry_shared_settings() {
        let opts = GenerationParams::default().options(ResponseMode::Deep);
        assert_eq!(opts.num_predict, 800);
        assert_eq!(opts.top_k, 30);
        assert_eq!(opts.repeat_penalty, 1.1);
        assert_eq!(opts.num_ctx, 4096);
    }
}
