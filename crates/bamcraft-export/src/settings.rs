//! Per-export settings

use std::str::FromStr;

use bamcraft_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings for one export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// How image references are materialized
    pub tex_mode: TextureMode,
    /// Folder beside the exported file that COPY mode writes into
    pub tex_copy_path: String,
    /// Use the packed physically-based material encoding instead of the
    /// conventional one
    pub use_pbs: bool,
    /// Container format version, passed through to the writer unmodified
    pub bam_version: BamVersion,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            tex_mode: TextureMode::Copy,
            tex_copy_path: "tex".into(),
            use_pbs: true,
            bam_version: BamVersion::default(),
        }
    }
}

/// Image materialization policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextureMode {
    /// Reference the absolute on-disk path
    Absolute,
    /// Reference a path relative to the exported file
    Relative,
    /// Copy images into a folder beside the exported file
    Copy,
    /// Intentionally unsupported; resolving any texture fails
    Include,
    /// Intentionally unsupported; resolving any texture fails
    Keep,
}

impl TextureMode {
    /// Name used in configuration and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            TextureMode::Absolute => "ABSOLUTE",
            TextureMode::Relative => "RELATIVE",
            TextureMode::Copy => "COPY",
            TextureMode::Include => "INCLUDE",
            TextureMode::Keep => "KEEP",
        }
    }
}

impl FromStr for TextureMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "ABSOLUTE" => Ok(TextureMode::Absolute),
            "RELATIVE" => Ok(TextureMode::Relative),
            "COPY" => Ok(TextureMode::Copy),
            "INCLUDE" => Ok(TextureMode::Include),
            "KEEP" => Ok(TextureMode::Keep),
            other => Err(Error::invalid_config(format!(
                "unknown texture mode '{other}'"
            ))),
        }
    }
}

/// Container format version, e.g. 6.41. The conversion core never
/// interprets it; the downstream writer does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BamVersion {
    pub major: u16,
    pub minor: u16,
}

/// Container versions the downstream writer is known to handle
const KNOWN_VERSIONS: [BamVersion; 6] = [
    BamVersion { major: 6, minor: 14 },
    BamVersion { major: 6, minor: 22 },
    BamVersion { major: 6, minor: 24 },
    BamVersion { major: 6, minor: 30 },
    BamVersion { major: 6, minor: 37 },
    BamVersion { major: 6, minor: 41 },
];

impl BamVersion {
    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Parse a version string such as "6.41". A well-formed but unknown
    /// version is passed through with a warning; only an unparsable
    /// string is an error.
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion {
            version: version.to_string(),
        };

        let (major, minor) = version.split_once('.').ok_or_else(invalid)?;
        let parsed = Self {
            major: major.trim().parse().map_err(|_| invalid())?,
            minor: minor.trim().parse().map_err(|_| invalid())?,
        };

        if !KNOWN_VERSIONS.contains(&parsed) {
            warn!(version = %parsed, "container version not in the known set");
        }
        Ok(parsed)
    }
}

impl Default for BamVersion {
    fn default() -> Self {
        Self::new(6, 41)
    }
}

impl std::fmt::Display for BamVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        assert_eq!(BamVersion::parse("6.41").unwrap(), BamVersion::new(6, 41));
        assert_eq!(BamVersion::parse("6.14").unwrap(), BamVersion::new(6, 14));
        assert!(BamVersion::parse("641").is_err());
        assert!(BamVersion::parse("six.fortyone").is_err());
    }

    #[test]
    fn test_version_display_roundtrip() {
        let version = BamVersion::parse("6.37").unwrap();
        assert_eq!(version.to_string(), "6.37");
    }

    #[test]
    fn test_texture_mode_from_str() {
        assert_eq!("copy".parse::<TextureMode>().unwrap(), TextureMode::Copy);
        assert_eq!(
            "ABSOLUTE".parse::<TextureMode>().unwrap(),
            TextureMode::Absolute
        );
        assert!("INLINE".parse::<TextureMode>().is_err());
    }
}
