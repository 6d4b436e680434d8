//! Batch command: apply one named effect with a parameter string
//!
//! This is the scripting entry point. A command names an effect symbol and
//! carries its parameters in string form (see [`Parameters`]). Recorded
//! macros are not supported.

use crate::error::{CoreError, Result};
use crate::params::Parameters;
use crate::progress::ProgressReporter;
use crate::registry::EffectRegistry;
use crate::traits::EffectOutcome;
use crate::types::{Selection, Track};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A single effect invocation by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCommand {
    /// Effect symbol, looked up in the registry
    pub command_name: String,
    /// Parameters in `Key=Value` form; empty keeps the effect defaults
    #[serde(default)]
    pub param_string: String,
}

impl BatchCommand {
    /// Create a new command
    pub fn new(command_name: impl Into<String>, param_string: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            param_string: param_string.into(),
        }
    }

    /// Apply the command to `selection` of every track
    ///
    /// The effect's status message, if any, is relayed to `progress`.
    ///
    /// # Errors
    /// Returns `CoreError::UnknownEffect` if no effect is registered under the
    /// name, a parameter error if the string is malformed or rejected, or the
    /// effect's own error.
    pub fn execute(
        &self,
        registry: &EffectRegistry,
        tracks: &mut [Track],
        selection: Selection,
        progress: &mut dyn ProgressReporter,
    ) -> Result<EffectOutcome> {
        let name = self.command_name.trim();
        let mut effect = registry
            .create(name)
            .ok_or_else(|| CoreError::UnknownEffect(name.to_string()))?;

        if !self.param_string.trim().is_empty() {
            let params = Parameters::parse(&self.param_string)?;
            effect.set_parameters(&params)?;
        }

        if effect.should_skip(selection) {
            debug!("{} would not change {}; skipping", effect.symbol(), selection);
            return Ok(EffectOutcome::Skipped);
        }

        info!(
            "Applying {} ({}) to {} track(s), selection {}",
            effect.symbol(),
            effect.parameters(),
            tracks.len(),
            selection
        );

        let outcome = effect.apply(tracks, selection, progress)?;
        if let Some(message) = outcome.message() {
            progress.status(message);
        }
        Ok(outcome)
    }
}
