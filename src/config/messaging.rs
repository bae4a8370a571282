//! Messaging limits

use serde::Deserialize;

use crate::domain::messaging::MessageLimits;

use super::error::ValidationError;

/// Content and paging limits for the messaging core.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,

    /// History page size when the client gives none
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,

    /// Upper bound on a client-requested page size
    #[serde(default = "default_max_history_page_size")]
    pub max_history_page_size: u32,
}

impl MessagingConfig {
    pub fn message_limits(&self) -> MessageLimits {
        MessageLimits {
            max_content_length: self.max_content_length,
            max_attachments: self.max_attachments,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_content_length == 0 {
            return Err(ValidationError::InvalidMessagingLimit("max_content_length"));
        }
        if self.history_page_size == 0 {
            return Err(ValidationError::InvalidMessagingLimit("history_page_size"));
        }
        if self.max_history_page_size < self.history_page_size {
            return Err(ValidationError::InvalidMessagingLimit("max_history_page_size"));
        }
        Ok(())
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            max_content_length: default_max_content_length(),
            max_attachments: default_max_attachments(),
            history_page_size: default_history_page_size(),
            max_history_page_size: default_max_history_page_size(),
        }
    }
}

fn default_max_content_length() -> usize {
    4000
}

fn default_max_attachments() -> usize {
    10
}

fn default_history_page_size() -> u32 {
    50
}

fn default_max_history_page_size() -> u32 {
    200
}
