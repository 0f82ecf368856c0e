use serde::{Deserialize, Serialize};

use crate::sieve::capabilities::Capabilities;

/// The capability announcement of one server, saved under a name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl CapabilityProfile {
    pub fn new<I, S>(name: &str, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = capabilities
            .into_iter()
            .map(|name| name.as_ref().to_ascii_lowercase())
            .collect();
        names.sort();
        names.dedup();
        Self {
            name: name.to_string(),
            capabilities: names,
        }
    }

    pub fn to_capabilities(&self) -> Capabilities {
        Capabilities::new(self.capabilities.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_names() {
        let profile = CapabilityProfile::new("work", ["FileInto", "copy", "fileinto"]);
        assert_eq!(profile.capabilities, vec!["copy", "fileinto"]);
        assert!(profile.to_capabilities().is_enabled("fileinto"));
    }

    #[test]
    fn test_missing_capabilities_default_to_empty() {
        let profile: CapabilityProfile = serde_json::from_str(r#"{"name":"bare"}"#).unwrap();
        assert_eq!(profile, CapabilityProfile::new("bare", Vec::<String>::new()));
    }
}
