use anyhow::Result;
use outline2book::core::config::{Config, CONFIG_FILE};
use outline2book::core::io::FileSink;
use outline2book::core::state::{RunStatus, BULLETS_PER_CHAPTER};
use outline2book::services::generator::Generator;
use outline2book::services::llm::create_llm;
use outline2book::services::setup::resolve_category;
use outline2book::services::workflow::BookWorkflow;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // 1. Load Config
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please ensure '{}' exists with valid LLM settings.", CONFIG_FILE);
            return Err(e);
        }
    };

    // 2. Initialize LLM
    let llm = create_llm(&config.llm)?;
    let generator = Generator::new(llm, config.llm.retry.clone());

    // 3. Ask for the topic
    let category = resolve_category(&config)?;

    // 4. Run Workflow
    let sink = Arc::new(FileSink::new(&config.output_file));
    let workflow = BookWorkflow::new(config.book.clone(), generator, sink);

    match workflow.run(&category).await? {
        RunStatus::Completed {
            chapters,
            failed_sections,
        } => {
            if failed_sections > 0 {
                println!(
                    "{} of {} sections could not be generated and were replaced by a placeholder.",
                    failed_sections,
                    chapters * BULLETS_PER_CHAPTER
                );
            }
            println!("Program completed successfully.");
            Ok(())
        }
        RunStatus::Aborted { reason } => {
            anyhow::bail!("Book generation aborted: {}", reason)
        }
    }
}
