//! Typed model of the platform server configuration (`server.hsconf`).
//!
//! # Document Layout
//!
//! ```text
//! <ServerConfigurations>
//! ├── PlatformDatabaseConfiguration  ProviderKey="..."
//! ├── LoggingDatabaseConfiguration   (read only when version is not 10.x)
//! ├── SessionDatabaseConfiguration
//! ├── ServiceConfiguration
//! └── ServerConfiguration
//!     └── <Port encrypted="true">...</Port>   ← one property per child
//! ```
//!
//! The whole document is read once by [`ServerConf::load`]. Missing
//! `ProviderKey` or `encrypted` attributes fall back to `""` and `false`;
//! a missing section or an unreadable document is fatal.

mod error;
mod section;
mod xml;

pub use error::{DocumentFault, ServerConfError};
pub use section::{Property, Section, SectionKind};

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::{fs::File, io::Read, path::Path};
use xml::Element;

/// Attribute holding a section's provider technology.
pub const PROVIDER_KEY_ATTRIBUTE: &str = "ProviderKey";
/// Attribute marking a property value as encrypted.
pub const ENCRYPTED_ATTRIBUTE: &str = "encrypted";

/// Platform major version that has no separate logging database section.
const UNGATED_VERSION_PREFIX: &str = "10.";

/// Decode raw document bytes, honoring a UTF-16 byte order mark.
fn decode_document(bytes: &[u8]) -> Option<String> {
    let utf16 = |rest: &[u8], unit: fn([u8; 2]) -> u16| {
        if rest.len() % 2 != 0 {
            return None;
        }
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| unit([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    };
    match bytes {
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8(bytes.to_vec()).ok(),
    }
}

// ============================================================================
// ServerConf
// ============================================================================

/// Parsed server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConf {
    platform_database: Section,
    logging_database: Option<Section>,
    session_database: Section,
    service_configuration: Section,
    server_configuration: Section,
}

impl ServerConf {
    /// Read and parse the document at `path`.
    ///
    /// The file may be UTF-8 or, when it starts with a byte order mark,
    /// UTF-16 in either byte order.
    pub fn load(path: &Path, platform_version: &str) -> Result<Self, ServerConfError> {
        let bytes = {
            let mut file =
                File::open(path).map_err(|err| DocumentFault::Io(path.to_path_buf(), err))?;
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .map_err(|err| DocumentFault::Io(path.to_path_buf(), err))?;
            bytes
        };
        let content = decode_document(&bytes).ok_or(DocumentFault::Encoding)?;
        Self::parse(&content, platform_version)
    }

    /// Parse an in-memory document.
    pub fn parse(content: &str, platform_version: &str) -> Result<Self, ServerConfError> {
        let root = xml::parse(content)?;
        let read = |kind| read_section(&root, kind);

        let platform_database = read(SectionKind::PlatformDatabase)?;
        let logging_database = if reads_logging_database(platform_version) {
            Some(read(SectionKind::LoggingDatabase)?)
        } else {
            None
        };

        Ok(Self {
            platform_database,
            logging_database,
            session_database: read(SectionKind::SessionDatabase)?,
            service_configuration: read(SectionKind::ServiceConfiguration)?,
            server_configuration: read(SectionKind::ServerConfiguration)?,
        })
    }

    pub fn platform_database(&self) -> &Section {
        &self.platform_database
    }

    /// `None` when the platform version gates the section out.
    pub fn logging_database(&self) -> Option<&Section> {
        self.logging_database.as_ref()
    }

    pub fn session_database(&self) -> &Section {
        &self.session_database
    }

    pub fn service_configuration(&self) -> &Section {
        &self.service_configuration
    }

    pub fn server_configuration(&self) -> &Section {
        &self.server_configuration
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        match kind {
            SectionKind::PlatformDatabase => Some(&self.platform_database),
            SectionKind::LoggingDatabase => self.logging_database.as_ref(),
            SectionKind::SessionDatabase => Some(&self.session_database),
            SectionKind::ServiceConfiguration => Some(&self.service_configuration),
            SectionKind::ServerConfiguration => Some(&self.server_configuration),
        }
    }

    /// Present sections in fixed order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        SectionKind::ALL
            .into_iter()
            .filter_map(|kind| self.section(kind))
    }
}

/// Serialized as an object keyed by element name; a gated-out section is `null`.
impl Serialize for ServerConf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(SectionKind::ALL.len()))?;
        for kind in SectionKind::ALL {
            map.serialize_entry(kind.element_name(), &self.section(kind))?;
        }
        map.end()
    }
}

/// The logging database section only exists outside the 10.x line.
pub fn reads_logging_database(platform_version: &str) -> bool {
    !platform_version.starts_with(UNGATED_VERSION_PREFIX)
}

// ============================================================================
// Section extraction
// ============================================================================

fn read_section(root: &Element, kind: SectionKind) -> Result<Section, ServerConfError> {
    let element = root
        .child(kind.element_name())
        .ok_or(ServerConfError::SectionMissing(kind))?;
    let provider_key = provider_key(root, kind).unwrap_or_default();

    let properties = element
        .children()
        .iter()
        .map(|child| read_property(root, kind, child.local_name()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Section::new(kind, provider_key, properties))
}

fn provider_key(root: &Element, kind: SectionKind) -> Option<String> {
    root.child(kind.element_name())?
        .attribute(PROVIDER_KEY_ATTRIBUTE)
        .map(str::to_string)
}

/// Resolve a property by name from the root, as enumerated from its section.
fn read_property(root: &Element, kind: SectionKind, name: &str) -> Result<Property, DocumentFault> {
    let element = root
        .child(kind.element_name())
        .and_then(|section| section.child(name))
        .ok_or_else(|| DocumentFault::PropertyVanished {
            section: kind,
            property: name.to_string(),
        })?;

    // exact match: "True", "TRUE" and "1" are not encrypted
    let is_encrypted = element.attribute(ENCRYPTED_ATTRIBUTE) == Some("true");

    Ok(Property::new(name, element.text(), is_encrypted))
}

// ============================================================================
// tests
// ============================================================================
