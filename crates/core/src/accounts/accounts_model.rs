use crate::errors::ValidationError;

/// Longest post accepted by the client.
pub const MAX_POST_LENGTH: usize = 280;

/// Post content that passed local checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft(String);

impl PostDraft {
    /// Trim and check the content. Blank content is rejected.
    pub fn parse(content: &str) -> Result<Self, ValidationError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyPost);
        }
        if trimmed.chars().count() > MAX_POST_LENGTH {
            return Err(ValidationError::PostTooLong(MAX_POST_LENGTH));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_is_trimmed() {
        assert_eq!(PostDraft::parse("  gm  ").unwrap().as_str(), "gm");
    }

    #[test]
    fn test_blank_post_rejected() {
        assert_eq!(PostDraft::parse(" \n\t "), Err(ValidationError::EmptyPost));
    }

    #[test]
    fn test_long_post_rejected() {
        let content = "a".repeat(MAX_POST_LENGTH + 1);
        assert_eq!(
            PostDraft::parse(&content),
            Err(ValidationError::PostTooLong(280))
        );
        assert!(PostDraft::parse(&"a".repeat(MAX_POST_LENGTH)).is_ok());
    }
}
