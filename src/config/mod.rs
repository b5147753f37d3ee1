//! Configuration management for Teve.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    external_services_configured, EmbeddingSettings, GeneralSettings, GenerationSettings,
    PromptSettings, RagSettings, Settings, VectorStoreSettings,
};
pub use settings::{ENV_GPT_API_KEY, ENV_GPT_FOLDER_ID, ENV_TRANSLATE_API_KEY};
