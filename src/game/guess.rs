use std::collections::HashMap;

use unicode_normalization::char::is_combining_mark;

use crate::game::text::{clean_text, word_key, words};

/// Result of a single guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    pub masked: String,
    pub revealed: bool,
}

/// Masking state of the title currently being guessed.
///
/// `alive_words` maps every normalized word of the title that has not been
/// guessed yet to its remaining number of occurrences. Counts are always at
/// least one; a word is removed once its last occurrence is guessed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessState {
    real_title: String,
    alive_words: HashMap<String, u32>,
}

impl GuessState {
    pub fn new(title: &str) -> Self {
        let mut alive_words = HashMap::new();
        for word in words(title) {
            *alive_words.entry(word).or_insert(0) += 1;
        }

        Self {
            real_title: title.to_string(),
            alive_words,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn real_title(&self) -> &str {
        &self.real_title
    }

    pub fn alive_words(&self) -> &HashMap<String, u32> {
        &self.alive_words
    }

    pub fn is_revealed(&self) -> bool {
        self.alive_words.is_empty()
    }

    /// Consumes every word of `text` that is still alive in the title.
    ///
    /// Words are taken from `text` split on single spaces and normalized one
    /// by one; unknown or already guessed words are ignored.
    pub fn guess(&mut self, text: &str) -> GuessOutcome {
        for raw in text.split(' ') {
            for word in clean_text(&raw.to_lowercase()).split_whitespace() {
                if let Some(remaining) = self.alive_words.get_mut(word) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        self.alive_words.remove(word);
                    }
                }
            }
        }

        GuessOutcome {
            masked: self.render(),
            revealed: self.is_revealed(),
        }
    }

    /// Title as shown to the player.
    ///
    /// Every alive word is replaced by one `"_ "` per character, symbols
    /// around it stay in place, and words are separated by single spaces.
    /// A fully guessed title is shown as is.
    pub fn render(&self) -> String {
        if self.alive_words.is_empty() {
            return self.real_title.clone();
        }

        let mut output = String::with_capacity(self.real_title.len() * 2);
        for word in self.real_title.split(' ') {
            self.render_word(word, &mut output);
            output.push(' ');
        }

        output.trim_matches(' ').to_string()
    }

    fn render_word(&self, word: &str, output: &mut String) {
        let mut run = String::new();
        for c in word.chars() {
            if c.is_alphanumeric() || (is_combining_mark(c) && !run.is_empty()) {
                run.push(c);
                continue;
            }
            self.flush_run(&mut run, output);
            output.push(c);
        }
        self.flush_run(&mut run, output);
    }

    fn flush_run(&self, run: &mut String, output: &mut String) {
        if run.is_empty() {
            return;
        }

        if self.alive_words.contains_key(&word_key(run)) {
            let letters = run.chars().filter(|c| !is_combining_mark(*c)).count();
            output.push_str(&"_ ".repeat(letters));
        } else {
            output.push_str(run);
        }
        run.clear();
    }
}
