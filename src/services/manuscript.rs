use crate::core::state::Chapter;

const TOC_HEADING: &str = "Table of Contents";

struct ChapterText {
    title: String,
    sections: Vec<String>,
}

/// Accumulates the book in memory until it is rendered for the sink.
pub struct Manuscript {
    section_break: String,
    chapters: Vec<ChapterText>,
}

impl Manuscript {
    pub fn new(section_break: &str) -> Self {
        Self {
            section_break: section_break.to_string(),
            chapters: Vec::new(),
        }
    }

    pub fn push_chapter(&mut self, chapter: &Chapter, sections: Vec<String>) {
        self.chapters.push(ChapterText {
            title: chapter.title.clone(),
            sections,
        });
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn table_of_contents(&self) -> String {
        let titles: Vec<&str> = self.chapters.iter().map(|c| c.title.as_str()).collect();
        format!("{}\n\n{}\n", TOC_HEADING, titles.join("\n"))
    }

    pub fn render(&self) -> String {
        let mut out = self.table_of_contents();
        out.push('\n');
        for chapter in &self.chapters {
            out.push_str(&format!("\n{}\n\n", self.section_break));
            out.push_str(&format!("{}\n\n", chapter.title));
            for section in &chapter.sections {
                out.push_str(section);
                out.push_str("\n\n");
            }
        }
        out
    }
}
