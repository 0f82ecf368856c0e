/// Capability sets and the requirements schemas place on them.
use std::collections::BTreeSet;

/// What a schema, tag or parameter needs from the capability set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requirement {
    #[default]
    None,
    One(&'static str),
    All(Vec<&'static str>),
    Any(Vec<&'static str>),
}

impl Requirement {
    pub fn all(names: &[&'static str]) -> Self {
        Self::All(names.to_vec())
    }

    pub fn any(names: &[&'static str]) -> Self {
        Self::Any(names.to_vec())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn names(&self) -> Vec<&'static str> {
        match self {
            Self::None => Vec::new(),
            Self::One(name) => vec![*name],
            Self::All(names) | Self::Any(names) => names.clone(),
        }
    }

    /// Adds the capabilities this requirement forces a script to import.
    /// For `Any`, the first enabled alternative is chosen, falling back to the first.
    pub fn collect(&self, capabilities: &Capabilities, out: &mut BTreeSet<&'static str>) {
        match self {
            Self::None => {}
            Self::One(name) => {
                out.insert(*name);
            }
            Self::All(names) => out.extend(names.iter().copied()),
            Self::Any(names) => {
                let chosen = names
                    .iter()
                    .find(|name| capabilities.is_enabled(name))
                    .or_else(|| names.first());
                if let Some(name) = chosen {
                    out.insert(*name);
                }
            }
        }
    }
}

impl From<&'static str> for Requirement {
    fn from(name: &'static str) -> Self {
        Self::One(name)
    }
}

/// The extension names a server advertises. Names are compared lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    enabled: BTreeSet<String>,
}

impl Capabilities {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            enabled: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_ascii_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(&name.to_ascii_lowercase())
    }

    pub fn enable(&mut self, name: &str) {
        self.enabled.insert(name.to_ascii_lowercase());
    }

    pub fn disable(&mut self, name: &str) {
        self.enabled.remove(&name.to_ascii_lowercase());
    }

    pub fn is_capable(&self, requirement: &Requirement) -> bool {
        match requirement {
            Requirement::None => true,
            Requirement::One(name) => self.is_enabled(name),
            Requirement::All(names) => names.iter().all(|n| self.is_enabled(n)),
            Requirement::Any(names) => names.iter().any(|n| self.is_enabled(n)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_capable() {
        let caps = Capabilities::new(["FileInto", "variables"]);
        assert!(caps.is_capable(&Requirement::None));
        assert!(caps.is_capable(&"fileinto".into()));
        assert!(!caps.is_capable(&"envelope".into()));
        assert!(caps.is_capable(&Requirement::all(&["fileinto", "variables"])));
        assert!(!caps.is_capable(&Requirement::all(&["fileinto", "envelope"])));
        assert!(caps.is_capable(&Requirement::any(&["envelope", "variables"])));
    }

    #[test]
    fn test_collect_any_prefers_enabled() {
        let caps = Capabilities::new(["spamtestplus"]);
        let mut out = BTreeSet::new();
        Requirement::any(&["spamtest", "spamtestplus"]).collect(&caps, &mut out);
        assert_eq!(out.into_iter().collect::<Vec<_>>(), vec!["spamtestplus"]);

        let mut out = BTreeSet::new();
        Requirement::any(&["spamtest", "spamtestplus"]).collect(&Capabilities::default(), &mut out);
        assert_eq!(out.into_iter().collect::<Vec<_>>(), vec!["spamtest"]);
    }
}
