use crate::error::IndexerError;
use regex::Regex;

/// Record attribute that receives each body chunk.
pub const CONTENT_FIELD: &str = "content";

/// Upper bound, in characters, of a single body chunk.
pub const CONTENT_CHAR_LIMIT: usize = 1_000;

// Comments and anything that opens like a tag up to its closing `>`. An opener
// followed by whitespace ("a < b") is kept; an unterminated tag runs to the end.
const MARKUP_PATTERN: &str = r"(?s)<!--.*?(?:-->|\z)|<[^\s<>][^>]*(?:>|\z)";

#[derive(Debug, Clone)]
pub struct MarkupStripper {
    pattern: Regex,
}

impl MarkupStripper {
    pub fn new() -> Result<Self, IndexerError> {
        Ok(Self {
            pattern: Regex::new(MARKUP_PATTERN)?,
        })
    }

    pub fn strip(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    pub field: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ContentSplitter {
    stripper: MarkupStripper,
    char_limit: usize,
}

impl ContentSplitter {
    pub fn new(char_limit: usize) -> Result<Self, IndexerError> {
        if char_limit == 0 {
            return Err(IndexerError::InvalidArgument(
                "content chunk limit must be positive".to_string(),
            ));
        }

        Ok(Self {
            stripper: MarkupStripper::new()?,
            char_limit,
        })
    }

    pub fn stripper(&self) -> &MarkupStripper {
        &self.stripper
    }

    /// Strips markup, then slices the text at fixed character offsets.
    ///
    /// Boundaries are not word-aware. Empty text still yields one empty
    /// chunk, so every content item produces at least one record.
    pub fn split(&self, field: &str, raw: &str) -> Vec<ContentChunk> {
        let stripped = self.stripper.strip(raw);
        let chars: Vec<char> = stripped.chars().collect();

        if chars.is_empty() {
            return vec![ContentChunk {
                field: field.to_string(),
                text: String::new(),
            }];
        }

        chars
            .chunks(self.char_limit)
            .map(|piece| ContentChunk {
                field: field.to_string(),
                text: piece.iter().collect(),
            })
            .collect()
    }
}
