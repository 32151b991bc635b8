//! Target identifier input
//!
//! The initial target comes from an injected line source. Invalid values are
//! rejected and the source is asked again until it yields a valid identifier
//! or runs dry.

use crate::state::TargetId;
use crate::CrawlError;
use std::io::BufRead;

/// A source of raw target identifier candidates
pub trait TargetSource {
    /// Returns the next candidate, or `None` once the source is exhausted
    fn next_candidate(&mut self) -> Result<Option<String>, CrawlError>;

    /// Called before each candidate is requested
    fn prompt(&mut self) {}
}

/// Reads one candidate per line from any buffered reader
pub struct LineSource<R> {
    reader: R,
    prompt: Option<String>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            prompt: None,
        }
    }

    /// Prints `prompt` on stdout before every read
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

impl<R: BufRead> TargetSource for LineSource<R> {
    fn next_candidate(&mut self) -> Result<Option<String>, CrawlError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self) {
        if let Some(prompt) = &self.prompt {
            println!("{}", prompt);
        }
    }
}

/// Keeps asking `source` until it yields a valid target identifier
///
/// # Returns
///
/// * `Ok(TargetId)` - The first valid identifier read
/// * `Err(CrawlError::InputClosed)` - The source ran out first
/// * `Err(CrawlError::Io)` - Reading from the source failed
pub fn prompt_target<S>(source: &mut S) -> Result<TargetId, CrawlError>
where
    S: TargetSource + ?Sized,
{
    loop {
        source.prompt();
        let Some(candidate) = source.next_candidate()? else {
            return Err(CrawlError::InputClosed);
        };

        match candidate.parse::<TargetId>() {
            Ok(target) => return Ok(target),
            Err(e) => tracing::warn!("{}", e),
        }
    }
}
