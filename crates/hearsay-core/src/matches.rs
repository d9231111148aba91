//! Named captures from the most recent successful match.

use std::ops::Index;

/// Placeholder values keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    entries: Vec<(String, String)>,
}

impl Matches {
    /// Pairs placeholder names with their captured values.
    pub fn new(names: &[String], values: &[String]) -> Self {
        Self {
            entries: names.iter().cloned().zip(values.iter().cloned()).collect(),
        }
    }

    /// Returns the value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if a value was captured for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of captured values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl Index<&str> for Matches {
    type Output = str;

    /// # Panics
    ///
    /// Panics if nothing was captured for `name`.
    fn index(&self, name: &str) -> &str {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no capture named '{name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lookup_and_order() {
        let matches = Matches::new(&names(&["name", "attribute"]), &names(&["Gandalf", "grey"]));

        assert_eq!(matches.len(), 2);
        assert_eq!(matches.get("name"), Some("Gandalf"));
        assert_eq!(&matches["attribute"], "grey");
        assert!(!matches.contains("colour"));
        assert_eq!(
            matches.iter().collect::<Vec<_>>(),
            vec![("name", "Gandalf"), ("attribute", "grey")]
        );
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Matches::default().is_empty());
    }

    #[test]
    #[should_panic(expected = "no capture named 'missing'")]
    fn test_index_missing_panics() {
        let _ = &Matches::default()["missing"];
    }
}
