//! Candidate sheet extraction.
//!
//! Yields the texts of a message that may hold a sheet: every attachment
//! with the sheet extension in attachment order, then the message body.

use crate::domain::{CandidateSheet, IncomingMessage, SheetSource, SHEET_EXTENSION};

use super::SheetGrammar;

/// RFC 3676 signature separator line.
const SIGNATURE_SEPARATOR: &str = "\n-- \n";

/// Extracts candidate sheets from incoming messages.
#[derive(Debug, Clone)]
pub struct SheetExtractor {
    grammar: SheetGrammar,
}

impl SheetExtractor {
    /// Creates an extractor that trims candidates to the given header grammar.
    pub fn new(grammar: SheetGrammar) -> Self {
        Self { grammar }
    }

    /// Returns the candidates of `message` in the order they should be tried.
    ///
    /// The iterator is lazy: each text is normalized only when reached.
    pub fn candidates<'a>(
        &'a self,
        message: &'a IncomingMessage,
    ) -> impl Iterator<Item = CandidateSheet> + 'a {
        let attachments = message
            .attachments
            .iter()
            .filter(|attachment| attachment.has_suffix(SHEET_EXTENSION))
            .map(|attachment| {
                let name = attachment.filename.clone().unwrap_or_default();
                (SheetSource::Attachment(name), attachment.body.as_str())
            });
        let body = std::iter::once((SheetSource::Body, message.body.as_str()));

        attachments
            .chain(body)
            .map(move |(source, text)| CandidateSheet::new(source, self.prepare(text)))
    }

    /// Normalizes line breaks and cuts the text down to the sheet itself.
    pub fn prepare(&self, text: &str) -> String {
        self.cut_out(&normalize_line_breaks(text))
    }

    /// Drops everything before the header line and a trailing signature block.
    ///
    /// Text without a header is returned unchanged.
    pub fn cut_out(&self, text: &str) -> String {
        let Some(start) = self.grammar.header_start(text) else {
            return text.to_string();
        };

        let sheet = &text[start..];
        match sheet.find(SIGNATURE_SEPARATOR) {
            Some(end) => sheet[..=end].to_string(),
            None => sheet.to_string(),
        }
    }
}

/// Converts `\r\n` and lone `\r` line breaks to `\n`.
pub fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
