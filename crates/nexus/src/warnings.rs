// nxtools modules
use nxtools_utils::f;

// external crates
use log::warn;

/// How much a problem found while decoding matters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Something didn't add up, but the data is kept
    #[default]
    Issue,
    /// The affected dataset or shape is dropped
    Error,
}

impl Severity {
    fn label(&self) -> &'static str {
        match self {
            Severity::Issue => "Issue",
            Severity::Error => "Error",
        }
    }
}

/// A single human readable problem found while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Whether data was dropped
    pub severity: Severity,
    /// Full message
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Every problem found while decoding, in the order found
///
/// Decoding carries on past anything recorded here. The collection renders as
/// one message per line.
///
/// ```rust
/// # use nxtools_nexus::{Severity, Warnings};
/// let mut warnings = Warnings::new();
/// warnings.push(Severity::Issue, "Unable to find object name for child of entry.");
/// warnings.record(
///     Severity::Error,
///     "NXoff_geometry",
///     "detector",
///     "Couldn't find faces attribute.",
/// );
///
/// assert_eq!(warnings.len(), 2);
/// assert_eq!(
///     warnings.to_string().lines().last(),
///     Some("Error encountered when constructing NXoff_geometry for component detector: Couldn't find faces attribute.")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    /// No warnings
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message as is
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.0.push(Warning { severity, message });
    }

    /// Record a problem with part of a component
    ///
    /// The message is prefixed with what was being built and for which
    /// component, e.g. `Issue encountered when constructing NXdetector for
    /// component panel:`.
    pub fn record(&mut self, severity: Severity, class: &str, component: &str, detail: &str) {
        self.push(
            severity,
            f!(
                "{} encountered when constructing {class} for component {component}: {detail}",
                severity.label()
            ),
        );
    }

    /// Iterate over the warnings
    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.0.iter()
    }

    /// Number of warnings
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing went wrong
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of warnings that dropped data
    pub fn error_count(&self) -> usize {
        self.iter().filter(|w| w.severity == Severity::Error).count()
    }

    /// True if any message contains `text`
    pub fn contains(&self, text: &str) -> bool {
        self.iter().any(|w| w.message.contains(text))
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for Warnings {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, warning) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{warning}")?;
        }
        Ok(())
    }
}

/// What is being built, for warning prefixes
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context<'a> {
    pub class: &'a str,
    pub component: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(class: &'a str, component: &'a str) -> Self {
        Self { class, component }
    }

    pub fn record(&self, warnings: &mut Warnings, severity: Severity, detail: &str) {
        warnings.record(severity, self.class, self.component, detail);
    }
}
