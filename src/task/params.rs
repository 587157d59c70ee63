// src/task/params.rs

//! Task parameters and graph-node identity.

use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping of parameter name → value.
///
/// Ordering is by parameter name, so two parameter sets built in different
/// insertion orders still compare (and hash) equal, and `Display` output is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameters(BTreeMap<String, String>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

/// Identity of a task in the graph: `(name, parameters)`.
///
/// Two tasks are the same graph node iff their `TaskId`s are equal; this is
/// the deduplication key during graph expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub name: String,
    pub parameters: Parameters,
}

impl TaskId {
    pub fn new(name: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parameters.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.parameters)
        }
    }
}

impl serde::Serialize for TaskId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_compare_independent_of_insertion_order() {
        let a = Parameters::new().with("cohort", "ACC").with("data_type", "expression");
        let b = Parameters::new().with("data_type", "expression").with("cohort", "ACC");
        assert_eq!(a, b);
    }

    #[test]
    fn task_id_display_includes_sorted_parameters() {
        let id = TaskId::new(
            "load-cohort-profile",
            Parameters::new().with("data_type", "expression").with("cohort", "ACC"),
        );
        assert_eq!(id.to_string(), "load-cohort-profile(cohort=ACC, data_type=expression)");

        let bare = TaskId::new("load-sample-meta", Parameters::new());
        assert_eq!(bare.to_string(), "load-sample-meta");
    }
}
