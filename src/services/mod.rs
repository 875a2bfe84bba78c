pub mod generator;
pub mod llm;
pub mod manuscript;
pub mod outline;
pub mod prompts;
pub mod setup;
pub mod workflow;
