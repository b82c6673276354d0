//! Input composer.
//!
//! Owns the draft text, cursor, and staged attachment between submissions.
//! Rendering of the input box stays with the host; the composer is the
//! state the keyboard-shortcut commands (emoji insert, attach/remove)
//! operate on.

use banter_core::session::FileRef;
use thiserror::Error;

/// Placeholder content for a submission that stages a file without text.
const FILE_ONLY_CONTENT: &str = "📎 File attached";

/// Errors raised while composing input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// The staged file exceeds the configured size limit.
    #[error("file size must be less than {limit_bytes} bytes")]
    AttachmentTooLarge { limit_bytes: u64 },
}

/// A validated, ready-to-send user submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Display content of the user message.
    pub content: String,
    /// Staged attachment metadata, if any.
    pub attachment: Option<FileRef>,
}

/// Draft state of the message input.
#[derive(Debug)]
pub struct Composer {
    draft: String,
    /// Byte offset into `draft`, always on a char boundary.
    cursor: usize,
    staged: Option<FileRef>,
    max_attachment_bytes: u64,
}

impl Composer {
    /// Creates an empty composer with the given attachment size limit.
    pub fn new(max_attachment_bytes: u64) -> Self {
        Self {
            draft: String::new(),
            cursor: 0,
            staged: None,
            max_attachment_bytes,
        }
    }

    /// Current draft text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the draft and moves the cursor to its end.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.cursor = self.draft.len();
    }

    /// Moves the cursor to the given byte offset, clamped to the draft and
    /// snapped down to the nearest char boundary.
    pub fn set_cursor(&mut self, offset: usize) {
        let mut offset = offset.min(self.draft.len());
        while offset > 0 && !self.draft.is_char_boundary(offset) {
            offset -= 1;
        }
        self.cursor = offset;
    }

    /// Splices an emoji (or any text) at the cursor and advances it.
    pub fn insert_emoji(&mut self, emoji: &str) {
        self.draft.insert_str(self.cursor, emoji);
        self.cursor += emoji.len();
    }

    /// Stages a file for the next submission, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `ComposeError::AttachmentTooLarge` if the file exceeds the
    /// configured limit; the previously staged file (if any) is kept.
    pub fn attach(&mut self, file: FileRef) -> Result<(), ComposeError> {
        if file.size_bytes > self.max_attachment_bytes {
            return Err(ComposeError::AttachmentTooLarge {
                limit_bytes: self.max_attachment_bytes,
            });
        }
        self.staged = Some(file);
        Ok(())
    }

    /// Clears the staged file, returning it.
    pub fn remove_attachment(&mut self) -> Option<FileRef> {
        self.staged.take()
    }

    /// The currently staged file, if any.
    pub fn staged(&self) -> Option<&FileRef> {
        self.staged.as_ref()
    }

    /// Takes the pending submission, emptying the composer.
    ///
    /// # Returns
    ///
    /// `None` when the trimmed draft is empty and no file is staged; the
    /// composer is left untouched in that case.
    pub fn take_submission(&mut self) -> Option<Submission> {
        let text = self.draft.trim();
        if text.is_empty() && self.staged.is_none() {
            return None;
        }

        let content = if text.is_empty() {
            FILE_ONLY_CONTENT.to_string()
        } else {
            text.to_string()
        };

        self.draft.clear();
        self.cursor = 0;
        Some(Submission {
            content,
            attachment: self.staged.take(),
        })
    }
}
