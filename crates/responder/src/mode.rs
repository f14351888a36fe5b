use modbot_core::{Intent, ResponseMode};

/// Chat-like intents answer fast; identity and context-less knowledge answer in standard mode;
/// knowledge with retrieved context answers deep.
pub fn determine_mode(intent: Intent, has_context: bool) -> ResponseMode {
    match intent {
        Intent::Conversational | Intent::Navigation | Intent::AccountHelp => ResponseMode::Fast,
        Intent::Identity => ResponseMode::Standard,
        Intent::Knowledge if has_context => ResponseMode::Deep,
        Intent::Knowledge => ResponseMode::Standard,
    }
}
