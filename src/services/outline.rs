use crate::core::state::{Chapter, BULLETS_PER_CHAPTER};
use log::debug;

pub const CHAPTER_MARKER: &str = "Chapter";
pub const BULLET_MARKER: char = '-';

/// Lines consumed after a chapter title, whether or not they turn out to be bullets.
pub const BULLET_WINDOW: usize = BULLETS_PER_CHAPTER;

enum ScanState<'a> {
    SeekingChapter,
    CollectingBullets {
        title: &'a str,
        remaining: usize,
        bullets: Vec<String>,
    },
}

/// Turns raw outline text into chapters with exactly five bullet points each.
///
/// A line starting with `Chapter` opens a window of the next [`BULLET_WINDOW`] lines.
/// Every line in that window is consumed; lines starting with `-` are kept as bullets.
/// The chapter is emitted only if the whole window was bullets.
pub fn parse_outline(outline: &str) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut state = ScanState::SeekingChapter;

    for line in outline.lines() {
        let line = line.trim();
        state = match state {
            ScanState::SeekingChapter => {
                if line.starts_with(CHAPTER_MARKER) {
                    ScanState::CollectingBullets {
                        title: line,
                        remaining: BULLET_WINDOW,
                        bullets: Vec::with_capacity(BULLET_WINDOW),
                    }
                } else {
                    ScanState::SeekingChapter
                }
            }
            ScanState::CollectingBullets {
                title,
                remaining,
                mut bullets,
            } => {
                if let Some(bullet) = bullet_text(line) {
                    bullets.push(bullet.to_string());
                }
                if remaining > 1 {
                    ScanState::CollectingBullets {
                        title,
                        remaining: remaining - 1,
                        bullets,
                    }
                } else {
                    finish_chapter(title, bullets, &mut chapters);
                    ScanState::SeekingChapter
                }
            }
        };
    }

    if let ScanState::CollectingBullets { title, bullets, .. } = state {
        debug!(
            "Outline ended inside chapter window, dropping '{}' ({} bullets)",
            title,
            bullets.len()
        );
    }

    chapters
}

fn bullet_text(line: &str) -> Option<&str> {
    let text = line.strip_prefix(BULLET_MARKER)?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn finish_chapter(title: &str, bullets: Vec<String>, chapters: &mut Vec<Chapter>) {
    let found = bullets.len();
    match Chapter::new(title, bullets) {
        Some(chapter) => chapters.push(chapter),
        None => debug!(
            "Dropping '{}': expected {} bullet points, found {}",
            title, BULLETS_PER_CHAPTER, found
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWELVE_CHAPTERS: &str = include_str!("../../testassets/outline_12_chapters.txt");

    #[test]
    fn test_parse_drops_short_trailing_chapter() {
        let outline = "Chapter 1: X\n- a\n- b\n- c\n- d\n- e\nChapter 2: Y\n- f\n- g";
        let chapters = parse_outline(outline);

        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Chapter 1: X");
        assert_eq!(chapters[0].bullet_points, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_parse_fixture_outline() {
        let chapters = parse_outline(TWELVE_CHAPTERS);
        assert_eq!(chapters.len(), 12);
        assert!(chapters.iter().all(|c| c.title.starts_with("Chapter")));
        assert_eq!(chapters[11].title, "Chapter 12: The Road Ahead");
    }

    #[test]
    fn test_window_is_consumed_even_when_chapter_is_dropped() {
        // Chapter 2 sits inside Chapter 1's window, so it is swallowed too.
        let outline = "Chapter 1: A\n- a\n- b\nChapter 2: B\n- c\n- d\n- e\n- f\n- g\n- h";
        assert!(parse_outline(outline).is_empty());

        // Once the window is spent, scanning resumes on the next title.
        let outline = "Chapter 1: A\n- a\n- b\nnoise\nnoise\nnoise\n\
                       Chapter 2: B\n- c\n- d\n- e\n- f\n- g";
        let chapters = parse_outline(outline);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Chapter 2: B");
    }

    #[test]
    fn test_bullets_are_trimmed_and_lines_indented() {
        let outline = "  Chapter 3: Indented  \n  -   one \n\t- two\n-three\n - four\n-    five   ";
        let chapters = parse_outline(outline);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Chapter 3: Indented");
        assert_eq!(chapters[0].bullet_points, ["one", "two", "three", "four", "five"]);
    }

    #[test]
    fn test_empty_bullet_does_not_qualify() {
        let outline = "Chapter 1: A\n- a\n-\n- c\n- d\n- e";
        assert!(parse_outline(outline).is_empty());
    }

    #[test]
    fn test_non_chapter_lines_are_skipped() {
        let outline = "Book Outline\n\nIntro text\nChapter 1: A\n- a\n- b\n- c\n- d\n- e\n\nEpilogue";
        let chapters = parse_outline(outline);
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn test_repeated_titles_are_kept() {
        let block = "Chapter 1: Same\n- a\n- b\n- c\n- d\n- e\n";
        let chapters = parse_outline(&block.repeat(2));
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0], chapters[1]);
    }

    #[test]
    fn test_only_complete_chapters_survive() {
        let outline = "Chapter 1\n- a\n- b\n- c\n- d\nx\n\
                       Chapter 2\n- a\n- b\n- c\n- d\n- e\n\
                       Chapter 3\n- a\nnot a bullet\n- c\n- d\n- e\n\
                       Chapter 4\n- only";
        let chapters = parse_outline(outline);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Chapter 2");
        assert!(chapters[0].bullet_points.iter().all(|b| !b.is_empty()));
    }

    #[test]
    fn test_empty_outline() {
        assert!(parse_outline("").is_empty());
        assert!(parse_outline("Chapter 1: Lonely").is_empty());
    }
}
