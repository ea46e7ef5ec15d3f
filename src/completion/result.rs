//! Completion results handed to the shell output writer

/// Completion pair representing a candidate suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPair {
    /// Text inserted on the command line
    pub value: String,
    /// Optional description for shells that can show one
    pub description: Option<String>,
}

impl CompletionPair {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }

    pub fn described(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: Some(description.into()),
        }
    }
}

impl From<&str> for CompletionPair {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CompletionPair {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<V: Into<String>, D: Into<String>> From<(V, D)> for CompletionPair {
    fn from((value, description): (V, D)) -> Self {
        Self::described(value, description)
    }
}

/// Outcome of a completion request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResult {
    /// Candidates in the order they were produced
    pub candidates: Vec<CompletionPair>,
    /// Whether candidates carry descriptions meant for display
    pub descriptive: bool,
}

impl CompletionResult {
    pub fn new(candidates: Vec<CompletionPair>, descriptive: bool) -> Self {
        Self {
            candidates,
            descriptive,
        }
    }

    /// Plain result from bare values
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            values.into_iter().map(|v| CompletionPair::new(v)).collect(),
            false,
        )
    }

    /// Candidate-only form of the result
    pub fn values(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.value.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}
