// Path: crates/security/src/policy/config/filter.rs
//! Name filters: decide whether a rule applies to a packet.

use super::name_relation::NameRelation;
use super::parser::ConfigNode;
use crate::regex::NdnRegex;
use ndn_types::error::ConfigError;
use ndn_types::Name;

/// A filter over the packet name.
#[derive(Debug)]
pub enum NameFilter {
    /// `type name`: a fixed name under a relation.
    Relation {
        /// The configured name.
        name: Name,
        /// How the configured name must relate to the packet name.
        relation: NameRelation,
    },
    /// `type regex`: an NDN regex the packet name must match.
    Regex(NdnRegex),
}

impl NameFilter {
    /// True when the packet name passes the filter.
    pub fn matches(&self, packet_name: &Name) -> bool {
        match self {
            Self::Relation { name, relation } => relation.check(name, packet_name),
            Self::Regex(regex) => regex.matches(packet_name),
        }
    }

    /// Builds a filter from a `filter` section.
    pub fn from_config(section: &ConfigNode) -> Result<Self, ConfigError> {
        match section.require("type")? {
            "name" => {
                if let Some(pattern) = section.value_of("regex") {
                    // `type name` with a regex sub-key is the legacy spelling.
                    return Ok(Self::Regex(NdnRegex::new(pattern)?));
                }
                let name = section
                    .require("name")?
                    .parse::<Name>()
                    .map_err(|e| ConfigError::Invalid(format!("filter name: {e}")))?;
                let relation = section.require("relation")?.parse::<NameRelation>()?;
                Ok(Self::Relation { name, relation })
            }
            "regex" => Ok(Self::Regex(NdnRegex::new(section.require("regex")?)?)),
            other => Err(ConfigError::Invalid(format!(
                "unknown filter type `{other}`"
            ))),
        }
    }
}
