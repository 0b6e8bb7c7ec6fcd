//! Code signals produced by the external feature extractor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of a single signal. Extractors emit either flags or counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Flag(bool),
    Number(f64),
}

impl SignalValue {
    /// `true`, or a finite non-zero number.
    pub fn is_set(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Number(n) => n.is_finite() && n != 0.0,
        }
    }

    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(n),
            Self::Number(_) => None,
            Self::Flag(flag) => Some(if flag { 1.0 } else { 0.0 }),
        }
    }
}

impl From<bool> for SignalValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<f64> for SignalValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Named signals. Ordered so serialization and iteration are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signals(BTreeMap<String, SignalValue>);

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SignalValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SignalValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<SignalValue> {
        self.0.get(name).copied()
    }

    /// Absent signals are unset.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(SignalValue::is_set)
    }

    /// Numeric value of a signal, if present and finite.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(SignalValue::as_number)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SignalValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>, V: Into<SignalValue>> FromIterator<(K, V)> for Signals {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut signals = Signals::new();
        for (k, v) in iter {
            signals.insert(k, v);
        }
        signals
    }
}
