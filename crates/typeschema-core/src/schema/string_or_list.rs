use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A keyword value that is either one string or a list of strings, such as
/// `type`.
///
/// A single entry is written as a bare string, anything else as an array.
/// Reading accepts both forms, so `"x"` and `["x"]` decode to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StringOrList(Vec<String>);

impl StringOrList {
    pub fn single(value: impl Into<String>) -> Self {
        Self(vec![value.into()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Append `value` unless it is already present.
    pub fn push_unique(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !self.contains(&value) {
            self.0.push(value);
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for StringOrList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<&str> for StringOrList {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

impl<const N: usize> From<[&str; N]> for StringOrList {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}

impl Serialize for StringOrList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for StringOrList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(value) => Self(vec![value]),
            Repr::Many(values) => Self(values),
        })
    }
}
