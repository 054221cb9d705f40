use crate::application::ports::TextSplitter;
use crate::domain::{Chunk, DocumentId};

/// Greedy sentence packer. Sentences are accumulated until the next one would
/// push the buffer past `target_chars`; the closed buffer's last
/// `overlap_words` words then seed the next chunk. A single sentence longer
/// than the target is never cut.
pub struct SentenceWindowSplitter {
    target_chars: usize,
    overlap_words: usize,
}

impl SentenceWindowSplitter {
    pub fn new(target_chars: usize, overlap_words: usize) -> Self {
        Self {
            target_chars,
            overlap_words,
        }
    }

    /// Chunk texts in order; empty when the input has no sentence content.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let sentences = text
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            let separator = usize::from(!current.is_empty());
            let potential_len = current.chars().count() + separator + sentence.chars().count();

            if potential_len > self.target_chars && !current.is_empty() {
                chunks.push(current.trim().to_string());
                current = format!("{} {}", self.overlap_tail(&current), sentence);
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(sentence);
            }
        }

        let remainder = current.trim();
        if !remainder.is_empty() {
            chunks.push(remainder.to_string());
        }

        chunks
    }

    fn overlap_tail(&self, buffer: &str) -> String {
        let words: Vec<&str> = buffer.split(' ').collect();
        let start = words.len().saturating_sub(self.overlap_words);
        words[start..].join(" ")
    }
}

impl Default for SentenceWindowSplitter {
    fn default() -> Self {
        Self::new(512, 50)
    }
}

impl TextSplitter for SentenceWindowSplitter {
    fn split(&self, text: &str, document_id: DocumentId) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk::new(document_id, index as u32, content))
            .collect()
    }
}
