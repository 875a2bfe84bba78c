use crate::core::config::BookConfig;
use crate::core::state::{Chapter, BULLETS_PER_CHAPTER};

pub fn outline_prompt(book: &BookConfig, category: &str) -> String {
    format!(
        "Generate a book outline for a {} book that is {} words in total. \
        Make each chapter have {} bullet points after the chapter title. There must be {} chapters. \
        Do not write anything in the response after the last bullet point of the last chapter is written.",
        category,
        with_thousands(book.total_words),
        BULLETS_PER_CHAPTER,
        book.chapter_count,
    )
}

pub fn section_prompt(book: &BookConfig, category: &str, chapter: &Chapter, bullet: &str) -> String {
    format!(
        "{} Write a section for the chapter titled '{}' in a book about {}, \
        based on the point: {}. Aim for approximately {} words.",
        book.style_instruction,
        chapter.title,
        category,
        bullet,
        with_thousands(book.section_words),
    )
}

fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter() -> Chapter {
        Chapter::new(
            "Chapter 4: Equipment",
            ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(60000), "60,000");
        assert_eq!(with_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_outline_prompt_defaults() {
        let prompt = outline_prompt(&BookConfig::default(), "gardening");
        assert!(prompt.starts_with("Generate a book outline for a gardening book"));
        assert!(prompt.contains("60,000 words in total"));
        assert!(prompt.contains("5 bullet points"));
        assert!(prompt.contains("There must be 12 chapters."));
    }

    #[test]
    fn test_section_prompt_embeds_everything() {
        let book = BookConfig::default();
        let prompt = section_prompt(&book, "beekeeping", &chapter(), "Smokers and hive tools");
        assert!(prompt.starts_with(&book.style_instruction));
        assert!(prompt.contains("'Chapter 4: Equipment'"));
        assert!(prompt.contains("a book about beekeeping"));
        assert!(prompt.contains("based on the point: Smokers and hive tools."));
        assert!(prompt.ends_with("Aim for approximately 1,000 words."));
    }
}
