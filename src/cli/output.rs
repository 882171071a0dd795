//! Terminal output for answers

use colored::*;
use std::io::Write;
use std::time::Duration;

use eyre::Result;

/// Prints text one word at a time
#[derive(Debug, Clone, Copy)]
pub struct WordStreamer {
    delay: Duration,
    color: bool,
}

impl WordStreamer {
    pub fn new(delay: Duration, color: bool) -> Self {
        Self { delay, color }
    }

    /// Write `text` to `out` word by word, pausing between words, then end the line
    pub async fn stream<W: Write>(&self, out: &mut W, text: &str) -> Result<()> {
        for (i, word) in split_words(text).into_iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.color {
                write!(out, "{}", word.green())?;
            } else {
                write!(out, "{}", word)?;
            }
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Split into words, each carrying its trailing whitespace
fn split_words(text: &str) -> Vec<&str> {
    text.split_inclusive(char::is_whitespace)
        .filter(|w| !w.is_empty())
        .collect()
}
