//! Section and property records.

use serde::{Serialize, Serializer};
use std::fmt;

/// The five sections a server configuration is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SectionKind {
    PlatformDatabase,
    LoggingDatabase,
    SessionDatabase,
    ServiceConfiguration,
    ServerConfiguration,
}

impl SectionKind {
    /// All sections, in document-model order.
    pub const ALL: [Self; 5] = [
        Self::PlatformDatabase,
        Self::LoggingDatabase,
        Self::SessionDatabase,
        Self::ServiceConfiguration,
        Self::ServerConfiguration,
    ];

    /// Element name of the section in the document.
    pub const fn element_name(self) -> &'static str {
        match self {
            Self::PlatformDatabase => "PlatformDatabaseConfiguration",
            Self::LoggingDatabase => "LoggingDatabaseConfiguration",
            Self::SessionDatabase => "SessionDatabaseConfiguration",
            Self::ServiceConfiguration => "ServiceConfiguration",
            Self::ServerConfiguration => "ServerConfiguration",
        }
    }

    /// Whether reading this section depends on the platform version.
    #[inline]
    pub const fn is_gated(self) -> bool {
        matches!(self, Self::LoggingDatabase)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

impl Serialize for SectionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.element_name())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One named value inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    name: String,
    value: String,
    is_encrypted: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>, is_encrypted: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_encrypted,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw text as stored; encrypted values are never decrypted.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_encrypted(&self) -> bool {
        self.is_encrypted
    }
}

/// One configuration section with its properties in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "section")]
    kind: SectionKind,
    provider_key: String,
    properties: Vec<Property>,
}

impl Section {
    pub fn new(kind: SectionKind, provider_key: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            kind,
            provider_key: provider_key.into(),
            properties,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.element_name()
    }

    /// Database or service technology identifier, empty when not set.
    pub fn provider_key(&self) -> &str {
        &self.provider_key
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// First property with the given name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_element_name() {
        assert_eq!(SectionKind::ServiceConfiguration.to_string(), "ServiceConfiguration");
        assert_eq!(
            SectionKind::PlatformDatabase.to_string(),
            "PlatformDatabaseConfiguration"
        );
    }

    #[test]
    fn test_only_logging_is_gated() {
        let gated: Vec<_> = SectionKind::ALL.into_iter().filter(|k| k.is_gated()).collect();
        assert_eq!(gated, vec![SectionKind::LoggingDatabase]);
    }

    #[test]
    fn test_property_lookup_returns_first_match() {
        let section = Section::new(
            SectionKind::ServerConfiguration,
            "",
            vec![
                Property::new("Port", "80", false),
                Property::new("Port", "443", true),
            ],
        );
        assert_eq!(section.len(), 2);
        assert_eq!(section.property("Port").unwrap().value(), "80");
        assert!(section.property("Host").is_none());
    }

    #[test]
    fn test_section_json_shape() {
        let section = Section::new(
            SectionKind::ServerConfiguration,
            "none",
            vec![Property::new("Port", "1099", true)],
        );
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "section": "ServerConfiguration",
                "providerKey": "none",
                "properties": [{"name": "Port", "value": "1099", "isEncrypted": true}]
            })
        );
    }
}
