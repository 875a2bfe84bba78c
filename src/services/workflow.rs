use crate::core::config::BookConfig;
use crate::core::io::OutputSink;
use crate::core::state::{Chapter, Generation, RunStatus, BULLETS_PER_CHAPTER};
use crate::services::generator::Generator;
use crate::services::manuscript::Manuscript;
use crate::services::outline::parse_outline;
use crate::services::prompts::{outline_prompt, section_prompt};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::sync::Arc;

const BULLET_PREVIEW_CHARS: usize = 50;

/// Drives one book: outline request, parsing, per-bullet sections, single write.
pub struct BookWorkflow {
    book: BookConfig,
    generator: Generator,
    sink: Arc<dyn OutputSink>,
}

impl BookWorkflow {
    pub fn new(book: BookConfig, generator: Generator, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            book,
            generator,
            sink,
        }
    }

    /// Only a sink failure is returned as an error; generation failures are
    /// absorbed into the returned status or placeholder text.
    pub async fn run(&self, category: &str) -> Result<RunStatus> {
        println!("Generating book outline...");
        let outline = match self.generator.generate(&outline_prompt(&self.book, category)).await {
            Generation::Text(text) => text,
            Generation::Failed => {
                println!("Failed to generate outline. Exiting...");
                return Ok(RunStatus::Aborted {
                    reason: "outline generation failed".to_string(),
                });
            }
        };

        println!("\nGenerated Book Outline:\n{}", outline);

        let chapters = parse_outline(&outline);
        if chapters.len() != self.book.chapter_count {
            warn!(
                "Expected {} chapters, but found {}. Proceeding anyway.",
                self.book.chapter_count,
                chapters.len()
            );
        }

        let (manuscript, failed_sections) = self.generate_sections(category, &chapters).await?;

        self.sink
            .write(&manuscript.render())
            .await
            .context("Failed to write manuscript")?;

        println!("\nBook content saved to {}", self.sink.describe());
        Ok(RunStatus::Completed {
            chapters: manuscript.chapter_count(),
            failed_sections,
        })
    }

    async fn generate_sections(
        &self,
        category: &str,
        chapters: &[Chapter],
    ) -> Result<(Manuscript, usize)> {
        let mut manuscript = Manuscript::new(&self.book.section_break);
        let mut failed_sections = 0;

        println!("\nStarting book content generation. This may take a while...");
        let pb = ProgressBar::new((chapters.len() * BULLETS_PER_CHAPTER) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );

        for (chapter_idx, chapter) in chapters.iter().enumerate() {
            pb.println(format!(
                "Generating content for {} ({}/{})...",
                chapter.title,
                chapter_idx + 1,
                chapters.len()
            ));

            let mut sections = Vec::with_capacity(BULLETS_PER_CHAPTER);
            for (bullet_idx, bullet) in chapter.bullet_points.iter().enumerate() {
                let preview: String = bullet.chars().take(BULLET_PREVIEW_CHARS).collect();
                pb.set_message(format!(
                    "section {}/{}: {}...",
                    bullet_idx + 1,
                    BULLETS_PER_CHAPTER,
                    preview
                ));

                let prompt = section_prompt(&self.book, category, chapter, bullet);
                let generation = self.generator.generate(&prompt).await;
                if generation.is_failed() {
                    warn!(
                        "Section {}/{} of '{}' failed, using placeholder",
                        bullet_idx + 1,
                        BULLETS_PER_CHAPTER,
                        chapter.title
                    );
                    failed_sections += 1;
                }
                sections.push(generation.text_or(&self.book.section_placeholder));
                pb.inc(1);
            }

            manuscript.push_chapter(chapter, sections);
        }

        pb.finish_and_clear();
        info!(
            "Generated {} chapters, {} sections replaced by placeholder",
            manuscript.chapter_count(),
            failed_sections
        );
        Ok((manuscript, failed_sections))
    }
}
