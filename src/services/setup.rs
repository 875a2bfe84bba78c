use crate::core::config::{Config, CONFIG_FILE};
use anyhow::{anyhow, bail, Result};
use inquire::validator::Validation;
use inquire::Text;

/// Returns the book topic: the configured one if present, otherwise asks on the console.
pub fn resolve_category(config: &Config) -> Result<String> {
    let min_len = config.book.min_category_length;

    if let Some(category) = &config.book.category {
        return check_category(category, min_len)
            .map(str::to_string)
            .map_err(|msg| anyhow!("Invalid book.category in {}: {}", CONFIG_FILE, msg));
    }

    if config.unattended {
        bail!("Unattended mode requires book.category in {}", CONFIG_FILE);
    }

    let answer = Text::new("Enter a category or topic for the book:")
        .with_validator(move |input: &str| {
            Ok(match check_category(input, min_len) {
                Ok(_) => Validation::Valid,
                Err(msg) => Validation::Invalid(msg.into()),
            })
        })
        .prompt()?;

    Ok(answer.trim().to_string())
}

fn check_category(input: &str, min_len: usize) -> std::result::Result<&str, String> {
    let trimmed = input.trim();
    if trimmed.chars().count() < min_len {
        Err(format!("Please enter at least {} characters.", min_len))
    } else {
        Ok(trimmed)
    }
}
