//! Test-only effect used by the registry and batch command tests

use crate::error::Result;
use crate::params::Parameters;
use crate::progress::ProgressReporter;
use crate::registry::EffectFactory;
use crate::traits::{Effect, EffectOutcome};
use crate::types::{Selection, Track};

/// Overwrites the selection with a constant level
#[derive(Debug, Default)]
pub(crate) struct SilenceEffect {
    pub(crate) level: f64,
}

impl SilenceEffect {
    pub(crate) fn factory() -> EffectFactory {
        EffectFactory::new("Silence", "Replace the selection with a constant", || {
            Box::new(Self::default())
        })
    }
}

impl Effect for SilenceEffect {
    fn symbol(&self) -> &'static str {
        "Silence"
    }

    fn description(&self) -> &'static str {
        "Replace the selection with a constant"
    }

    fn parameters(&self) -> Parameters {
        Parameters::new().with("Level", self.level)
    }

    fn set_parameters(&mut self, params: &Parameters) -> Result<()> {
        for (name, _) in params.iter() {
            if !name.eq_ignore_ascii_case("Level") {
                return Err(crate::CoreError::UnknownParameter(name.to_string()));
            }
        }
        if let Some(level) = params.get_f64("Level")? {
            self.level = level;
        }
        Ok(())
    }

    fn should_skip(&self, selection: Selection) -> bool {
        selection.is_empty()
    }

    fn apply(
        &self,
        tracks: &mut [Track],
        selection: Selection,
        progress: &mut dyn ProgressReporter,
    ) -> Result<EffectOutcome> {
        for track in tracks.iter_mut() {
            for channel in track.channels_mut() {
                let range = selection.clamp_to(channel.len());
                let block = vec![self.level as f32; range.len() as usize];
                channel.write_block(range.start, &block)?;
                if progress.report(1.0).is_cancel() {
                    return Ok(EffectOutcome::Cancelled);
                }
            }
        }
        Ok(EffectOutcome::Completed {
            message: Some(format!("Silenced {} track(s)", tracks.len())),
        })
    }
}
