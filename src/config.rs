//! Inspection settings.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{Error, Result};
use crate::layout::LayoutVersion;

/// Environment variable selecting the layout of the global inspector.
pub const LAYOUT_ENV: &str = "MYSQL_INTERNALS_LAYOUT";

/// Which driver layouts the probe may confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutSelection {
    /// Try every known layout matching the handle's type name, newest first.
    #[default]
    Auto,
    /// Only accept this layout.
    Pinned(LayoutVersion),
}

impl LayoutSelection {
    /// Layouts to try, in order.
    pub fn versions(&self) -> &[LayoutVersion] {
        match self {
            LayoutSelection::Auto => &LayoutVersion::ALL,
            LayoutSelection::Pinned(version) => std::slice::from_ref(version),
        }
    }
}

impl fmt::Display for LayoutSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutSelection::Auto => f.write_str("auto"),
            LayoutSelection::Pinned(version) => fmt::Display::fmt(version, f),
        }
    }
}

impl FromStr for LayoutSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(LayoutSelection::Auto);
        }
        s.parse().map(LayoutSelection::Pinned)
    }
}

/// Settings of an [`Inspector`](crate::Inspector).
#[derive(Debug, Clone, Default)]
pub struct InspectConfig {
    /// Layouts the probe may confirm.
    pub layout: LayoutSelection,
}

impl InspectConfig {
    /// Default settings: automatic layout detection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the layouts to probe.
    ///
    /// # Example
    ///
    /// ```
    /// use mysql_internals_rs::{InspectConfig, LayoutSelection, LayoutVersion};
    ///
    /// let config = InspectConfig::new()
    ///     .with_layout(LayoutSelection::Pinned(LayoutVersion::ResultSet));
    /// assert_eq!(config.layout.versions(), &[LayoutVersion::ResultSet]);
    /// ```
    pub fn with_layout(mut self, layout: LayoutSelection) -> Self {
        self.layout = layout;
        self
    }

    /// Settings from the environment (`MYSQL_INTERNALS_LAYOUT`).
    ///
    /// Unset or invalid values select [`LayoutSelection::Auto`].
    pub fn from_env() -> Self {
        Self::from_layout_var(std::env::var(LAYOUT_ENV).ok().as_deref())
    }

    fn from_layout_var(value: Option<&str>) -> Self {
        let layout = match value.map(str::parse::<LayoutSelection>) {
            None => LayoutSelection::Auto,
            Some(Ok(layout)) => layout,
            Some(Err(err)) => {
                warn!(variable = LAYOUT_ENV, %err, "ignoring layout setting");
                LayoutSelection::Auto
            }
        };
        Self { layout }
    }
}
