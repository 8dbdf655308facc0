//! Ordered, deduplicated collection of migration steps.

use std::fmt;
use std::slice;

use vellum_types::SchemaVersion;

use crate::error::RegistrationError;
use crate::step::MigrationStep;

/// Migration steps in strictly ascending version order.
///
/// Ordering is enforced at registration, so a misordered build fails at
/// startup before any state is touched.
#[derive(Default)]
pub struct MigrationRegistry {
    steps: Vec<Box<dyn MigrationStep>>,
}

impl MigrationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from steps in build order, stopping at the first bad one.
    pub fn from_steps<I>(steps: I) -> Result<Self, RegistrationError>
    where
        I: IntoIterator<Item = Box<dyn MigrationStep>>,
    {
        let mut registry = Self::new();
        for step in steps {
            registry.register_boxed(step)?;
        }
        Ok(registry)
    }

    pub fn register<S>(&mut self, step: S) -> Result<(), RegistrationError>
    where
        S: MigrationStep + 'static,
    {
        self.register_boxed(Box::new(step))
    }

    pub fn register_boxed(&mut self, step: Box<dyn MigrationStep>) -> Result<(), RegistrationError> {
        let version = step.version();
        if version.is_initial() {
            return Err(RegistrationError::ZeroVersion);
        }
        if let Some(latest) = self.latest_version() {
            if version == latest {
                return Err(RegistrationError::Duplicate { version });
            }
            if version < latest {
                return Err(RegistrationError::OutOfOrder { version, latest });
            }
        }
        tracing::debug!(%version, description = step.description(), "Registered migration");
        self.steps.push(step);
        Ok(())
    }

    /// Highest registered version, if any.
    #[must_use]
    pub fn latest_version(&self) -> Option<SchemaVersion> {
        self.steps.last().map(|step| step.version())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All steps, ascending by version. Cloning the iterator restarts nothing;
    /// calling this again yields the same sequence.
    #[must_use]
    pub fn ordered(&self) -> Steps<'_> {
        Steps {
            inner: self.steps.iter(),
        }
    }

    /// Steps with `after < version <= up_to`, ascending.
    pub fn eligible(
        &self,
        after: SchemaVersion,
        up_to: SchemaVersion,
    ) -> impl Iterator<Item = &dyn MigrationStep> + Clone + '_ {
        self.ordered()
            .skip_while(move |step| step.version() <= after)
            .take_while(move |step| step.version() <= up_to)
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|step| step.version()))
            .finish()
    }
}

/// Iterator over registered steps in version order.
#[derive(Clone)]
pub struct Steps<'a> {
    inner: slice::Iter<'a, Box<dyn MigrationStep>>,
}

impl<'a> Iterator for Steps<'a> {
    type Item = &'a dyn MigrationStep;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.inner.next()?;
        Some(&**step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Steps<'_> {}
