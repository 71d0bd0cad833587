use super::error::{ParseError, ParseResult};
use crate::definitions::Address;
use std::collections::HashMap;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, Address>,
}

impl LabelTable {
    pub fn lookup(&self, label: &str) -> Option<Address> {
        self.labels.get(label).copied()
    }

    /// Bind a label to the address of the instruction that follows it
    ///
    /// a label can only be defined once, even if both definitions would have the same address
    pub fn define(&mut self, label: impl Into<String>, address: Address) -> ParseResult<()> {
        let label = label.into();
        if self.labels.contains_key(&label) {
            return Err(ParseError::LabelRedefined(label));
        }
        self.labels.insert(label, address);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_at_address_zero_cannot_be_redefined() {
        let mut table = LabelTable::default();
        table.define("start", 0).unwrap();
        assert_eq!(
            Err(ParseError::LabelRedefined("start".to_owned())),
            table.define("start", 12)
        );
        assert_eq!(Some(0), table.lookup("start"));
    }

    #[test]
    fn test_lookup_missing() {
        let table = LabelTable::default();
        assert_eq!(None, table.lookup("nowhere"));
        assert!(table.is_empty());
    }
}
