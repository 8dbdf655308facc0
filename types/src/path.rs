use std::fmt;

/// Dotted location inside a blob's `data`, rendered as `state.A.b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StatePath {
    segments: Vec<String>,
}

impl StatePath {
    /// The `data` mapping itself.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A top-level controller key.
    #[must_use]
    pub fn key(name: impl Into<String>) -> Self {
        Self::root().child(name)
    }

    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("state")?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}
