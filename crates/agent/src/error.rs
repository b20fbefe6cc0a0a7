use stackwright_core::error::ProviderError;

/// Why a template run stopped without producing a template.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The model kept asking for tools after the budget was spent. Usually
    /// means it is stuck asking for the same schema over and over.
    #[error("Too many tool iterations ({iterations}), the model is probably stuck in a loop")]
    LoopExhausted { iterations: u32 },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Model did not answer within {secs}s")]
    ModelTimeout { secs: u64 },
}
