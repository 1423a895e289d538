pub type PendulaResult<T> = Result<T, PendulaError>;

#[derive(thiserror::Error, Debug)]
pub enum PendulaError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("deck error: {0}")]
    Deck(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PendulaError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn deck(msg: impl Into<String>) -> Self {
        Self::Deck(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PendulaError::invalid_config("x")
                .to_string()
                .contains("invalid config:")
        );
        assert!(PendulaError::render("x").to_string().contains("render error:"));
        assert!(PendulaError::encode("x").to_string().contains("encode error:"));
        assert!(PendulaError::deck("x").to_string().contains("deck error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PendulaError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
