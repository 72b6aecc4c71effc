//! @ai:module:intent Parameter values and canonical parameter bags
//! @ai:module:layer domain
//! @ai:module:public_api ParamValue, ParamBag, abbreviate
//! @ai:module:stateless true

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// @ai:intent A single kernel-generation parameter value
/// @ai:invariant no float variant; values must stay totally ordered and hashable
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// @ai:intent Integer view of the value, if it is one
    /// @ai:effects pure
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// @ai:intent Integer list view, e.g. WorkGroup [16, 16, 1]
    /// @ai:effects pure
    pub fn as_int_list(&self) -> Option<Vec<i64>> {
        match self {
            ParamValue::List(items) => items.iter().map(ParamValue::as_int).collect(),
            _ => None,
        }
    }

    /// @ai:intent Compact rendering used inside generated names
    /// @ai:effects pure
    pub fn name_fragment(&self) -> String {
        match self {
            ParamValue::Bool(true) => "1".to_string(),
            ParamValue::Bool(false) => "0".to_string(),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Str(v) => v.clone(),
            ParamValue::List(items) => items
                .iter()
                .map(ParamValue::name_fragment)
                .collect::<Vec<_>>()
                .join("x"),
        }
    }
}

struct ParamValueVisitor;

impl<'de> Visitor<'de> for ParamValueVisitor {
    type Value = ParamValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, integer, string or list of parameter values")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<ParamValue, E> {
        Ok(ParamValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ParamValue, E> {
        Ok(ParamValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ParamValue, E> {
        i64::try_from(v)
            .map(ParamValue::Int)
            .map_err(|_| E::custom(format!("integer parameter value {} is out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ParamValue, E> {
        Err(E::custom(format!(
            "floating-point parameter value {} is not supported; use an integer or a quoted string",
            v
        )))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ParamValue, E> {
        Ok(ParamValue::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ParamValue, E> {
        Ok(ParamValue::Str(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ParamValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ParamValue::List(items))
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ParamValueVisitor)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Str(v) => write!(f, "{}", v),
            ParamValue::List(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", inner.join(", "))
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<Vec<i32>> for ParamValue {
    fn from(v: Vec<i32>) -> Self {
        ParamValue::List(v.into_iter().map(|x| ParamValue::Int(i64::from(x))).collect())
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<Vec<i64>> for ParamValue {
    fn from(v: Vec<i64>) -> Self {
        ParamValue::List(v.into_iter().map(ParamValue::Int).collect())
    }
}

/// @ai:intent Canonically ordered parameter name to value mapping
/// @ai:invariant equality and hashing do not depend on insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamBag(BTreeMap<String, ParamValue>);

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ParamValue::as_int)
    }

    pub fn get_int_list(&self, key: &str) -> Option<Vec<i64>> {
        self.get(key).and_then(ParamValue::as_int_list)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    /// @ai:intent Builder-style insert
    /// @ai:effects pure
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// @ai:intent Overlay another bag; keys in `other` win
    /// @ai:effects pure
    pub fn merge(&mut self, other: &ParamBag) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// @ai:intent Entries present here but not (with the same value) in `other`
    /// @ai:effects pure
    pub fn difference(&self, other: &ParamBag) -> Vec<(String, ParamValue)> {
        self.0
            .iter()
            .filter(|(key, value)| other.get(key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl FromIterator<(String, ParamValue)> for ParamBag {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ParamBag {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// @ai:intent Short form of a parameter name: its non-lowercase characters
/// @ai:effects pure
pub fn abbreviate(name: &str) -> String {
    name.chars().filter(|c| !c.is_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_equality_ignores_insertion_order() {
        let mut a = ParamBag::new();
        a.insert("DepthU", 16);
        a.insert("WorkGroup", vec![16, 16, 1]);

        let mut b = ParamBag::new();
        b.insert("WorkGroup", vec![16, 16, 1]);
        b.insert("DepthU", 16);

        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = ParamBag::new().with("DepthU", 8).with("PrefetchGlobalRead", true);
        base.merge(&ParamBag::new().with("DepthU", 32));

        assert_eq!(base.get_int("DepthU"), Some(32));
        assert_eq!(base.get("PrefetchGlobalRead"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_difference_is_asymmetric() {
        let a = ParamBag::new().with("DataType", "s").with("Batched", true);
        let b = ParamBag::new().with("DataType", "d").with("Batched", true);

        assert_eq!(a.difference(&b), vec![("DataType".to_string(), ParamValue::from("s"))]);
        assert_eq!(b.difference(&a), vec![("DataType".to_string(), ParamValue::from("d"))]);
    }

    #[test]
    fn test_abbreviate_and_fragment() {
        assert_eq!(abbreviate("MacroTile0"), "MT0");
        assert_eq!(abbreviate("WorkGroup"), "WG");
        assert_eq!(ParamValue::from(vec![16, 16, 1]).name_fragment(), "16x16x1");
        assert_eq!(ParamValue::Bool(false).name_fragment(), "0");
    }

    #[test]
    fn test_untagged_yaml_values() {
        let bag: ParamBag =
            serde_yaml::from_str("WorkGroup: [8, 8, 1]\nKernelLanguage: Assembly\nUseSgpr: true\n")
                .unwrap();

        assert_eq!(bag.get_int_list("WorkGroup"), Some(vec![8, 8, 1]));
        assert_eq!(bag.get("KernelLanguage").and_then(ParamValue::as_str), Some("Assembly"));
        assert_eq!(bag.get("UseSgpr").and_then(ParamValue::as_bool), Some(true));
    }

    #[test]
    fn test_float_values_are_rejected_with_message() {
        let err = serde_yaml::from_str::<ParamBag>("DepthU: 16\nScale: 1.5\n").unwrap_err();
        assert!(err.to_string().contains("floating-point parameter value 1.5"));

        let quoted: ParamBag = serde_yaml::from_str("Scale: \"1.5\"\n").unwrap();
        assert_eq!(quoted.get("Scale").and_then(ParamValue::as_str), Some("1.5"));
    }
}
