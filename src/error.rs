use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// An error anchored at a byte offset of the source buffer.
    #[error("{message} (at offset {offset})")]
    At { offset: usize, message: String },

    /// An error with no meaningful source position.
    #[error("{0}")]
    Internal(String),
}

impl CompileError {
    pub fn at(offset: usize, message: impl Into<String>) -> Self {
        Self::At {
            offset,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::At { message, .. } => message,
            CompileError::Internal(message) => message,
        }
    }

    /// Formats the error the way it is shown to the user: the source line
    /// holding the offending offset, a caret under it, then the message.
    pub fn render(&self, source: &str) -> String {
        let (offset, message) = match self {
            CompileError::At { offset, message } => (*offset, message),
            CompileError::Internal(message) => return format!("error: {message}"),
        };

        let offset = offset.min(source.len());
        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| i + offset);
        let line = &source[line_start..line_end];
        let column = source[line_start..offset].chars().count();

        format!("{line}\n{}^ {message}", " ".repeat(column))
    }
}
