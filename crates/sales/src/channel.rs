use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult, ValueObject};

/// Sales channel an order was taken through.
///
/// Channels are typed: a `website` channel with code "default" is distinct
/// from any other channel type carrying the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesChannel {
    channel_type: String,
    code: String,
}

impl SalesChannel {
    /// Channel type for storefront websites.
    pub const TYPE_WEBSITE: &'static str = "website";

    pub fn new(channel_type: impl Into<String>, code: impl Into<String>) -> DomainResult<Self> {
        let channel_type = channel_type.into();
        let code = code.into();

        if channel_type.trim().is_empty() {
            return Err(DomainError::validation("sales channel type cannot be empty"));
        }
        if code.trim().is_empty() {
            return Err(DomainError::validation("sales channel code cannot be empty"));
        }

        Ok(Self { channel_type, code })
    }

    /// Convenience constructor for website channels.
    pub fn website(code: impl Into<String>) -> DomainResult<Self> {
        Self::new(Self::TYPE_WEBSITE, code)
    }

    pub fn channel_type(&self) -> &str {
        &self.channel_type
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl core::fmt::Display for SalesChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.channel_type, self.code)
    }
}

impl ValueObject for SalesChannel {}
