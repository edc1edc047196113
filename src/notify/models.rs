use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short message for the user, shown once and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
        }
    }

    pub fn info(message: &str) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn error(message: &str) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "Error: {}", self.message),
        }
    }
}
