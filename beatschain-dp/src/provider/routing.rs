//! Identifier classification for source routing

/// Shape of a caller-supplied identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Empty or whitespace only; never reaches a backend
    Empty,
    /// `0x`/`0X`-prefixed, looked up on chain first
    Wallet,
    /// Digits only, treated as a token id
    Numeric,
    /// Anything else (slug, document id)
    Opaque,
}

impl IdKind {
    pub fn classify(id: &str) -> Self {
        if id.trim().is_empty() {
            IdKind::Empty
        } else if id.starts_with("0x") || id.starts_with("0X") {
            IdKind::Wallet
        } else if id.bytes().all(|b| b.is_ascii_digit()) {
            IdKind::Numeric
        } else {
            IdKind::Opaque
        }
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::Empty => write!(f, "empty"),
            IdKind::Wallet => write!(f, "wallet"),
            IdKind::Numeric => write!(f, "numeric"),
            IdKind::Opaque => write!(f, "opaque"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(IdKind::classify(""), IdKind::Empty);
        assert_eq!(IdKind::classify("   "), IdKind::Empty);
        assert_eq!(IdKind::classify("0xABC"), IdKind::Wallet);
        assert_eq!(
            IdKind::classify("0X52908400098527886E0F7030069857D2E4169EE7"),
            IdKind::Wallet
        );
        assert_eq!(
            IdKind::classify("0x52908400098527886E0F7030069857D2E4169EE7"),
            IdKind::Wallet
        );
        assert_eq!(IdKind::classify("42"), IdKind::Numeric);
        assert_eq!(IdKind::classify("007"), IdKind::Numeric);
        assert_eq!(IdKind::classify("abc-beat"), IdKind::Opaque);
        assert_eq!(IdKind::classify("42a"), IdKind::Opaque);
        assert_eq!(IdKind::classify("-1"), IdKind::Opaque);
    }
}
