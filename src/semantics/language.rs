//! Java language levels, as `jvmTarget` spells them.

use std::fmt;

/// A Java language level, identified by its feature release.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageLevel(u8);

impl LanguageLevel {
    pub const JDK_1_6: Self = Self(6);
    pub const JDK_1_7: Self = Self(7);
    pub const JDK_1_8: Self = Self(8);
    pub const JDK_9: Self = Self(9);
    pub const JDK_11: Self = Self(11);
    pub const JDK_17: Self = Self(17);
    pub const JDK_21: Self = Self(21);

    /// Newest release the Kotlin compiler can target.
    const MAX_JVM_TARGET: u8 = 21;

    pub const fn new(feature: u8) -> Self {
        Self(feature)
    }

    pub fn feature(self) -> u8 {
        self.0
    }

    /// Reads `1.8`, `8`, `VERSION_1_8` or `JavaVersion.VERSION_11`.
    /// Pre-9 releases may carry the `1.` prefix; later ones may not.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix("JavaVersion.").unwrap_or(text);
        let version = match text.strip_prefix("VERSION_") {
            Some(rest) => rest.replace('_', "."),
            None => text.to_owned(),
        };
        let feature = match version.strip_prefix("1.") {
            Some(legacy) => legacy.parse::<u8>().ok().filter(|&n| n <= 8)?,
            None => version.parse::<u8>().ok().filter(|&n| n >= 5)?,
        };
        Some(Self(feature))
    }

    /// The `jvmTarget` value for this level, if it can be targeted.
    ///
    /// Java 7 never was a Kotlin target.
    pub fn jvm_target(self) -> Option<String> {
        match self.0 {
            6 | 8 => Some(format!("1.{}", self.0)),
            9..=Self::MAX_JVM_TARGET => Some(self.0.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 <= 8 { write!(f, "1.{}", self.0) } else { write!(f, "{}", self.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spellings() {
        assert_eq!(LanguageLevel::parse("1.8"), Some(LanguageLevel::JDK_1_8));
        assert_eq!(LanguageLevel::parse("17"), Some(LanguageLevel::JDK_17));
        assert_eq!(LanguageLevel::parse("VERSION_1_6"), Some(LanguageLevel::JDK_1_6));
        assert_eq!(LanguageLevel::parse("JavaVersion.VERSION_11"), Some(LanguageLevel::JDK_11));
        assert_eq!(LanguageLevel::parse("1.11"), None);
        assert_eq!(LanguageLevel::parse("8"), Some(LanguageLevel::JDK_1_8));
        assert_eq!(LanguageLevel::parse("1"), None);
        assert_eq!(LanguageLevel::parse("latest"), None);
    }

    #[test]
    fn test_jvm_target() {
        assert_eq!(LanguageLevel::JDK_1_6.jvm_target().as_deref(), Some("1.6"));
        assert_eq!(LanguageLevel::JDK_9.jvm_target().as_deref(), Some("9"));
        assert_eq!(LanguageLevel::JDK_1_7.jvm_target(), None);
        assert_eq!(LanguageLevel::new(40).jvm_target(), None);
        assert_eq!(LanguageLevel::JDK_1_7.to_string(), "1.7");
    }
}
