//! `Normalize` as a registry effect

use crate::normalizer::{ApplyOutcome, Normalizer};
use crate::settings::NormalizeSettings;
use crate::{DEFAULT_BLOCK_SIZE, NORMALIZE_SYMBOL};
use sonance_core::{
    CoreError, Effect, EffectFactory, EffectOutcome, EffectRegistry, Parameters, ProgressReporter,
    Selection, Track,
};

const DESCRIPTION: &str = "Sets the peak amplitude of one or more tracks and removes DC offset";

/// Normalization exposed through the generic `Effect` interface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeEffect {
    settings: NormalizeSettings,
    block_size: usize,
}

impl NormalizeEffect {
    /// Create the effect with the given settings
    pub fn new(settings: NormalizeSettings) -> Self {
        Self {
            settings,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Override the streaming block size
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Current settings
    pub fn settings(&self) -> &NormalizeSettings {
        &self.settings
    }

    /// Registry factory producing the effect with `defaults`
    pub fn factory(defaults: NormalizeSettings, block_size: usize) -> EffectFactory {
        EffectFactory::new(NORMALIZE_SYMBOL, DESCRIPTION, move || {
            Box::new(Self::new(defaults).with_block_size(block_size))
        })
    }

    fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.settings).with_block_size(self.block_size)
    }
}

impl Default for NormalizeEffect {
    fn default() -> Self {
        Self::new(NormalizeSettings::default())
    }
}

impl Effect for NormalizeEffect {
    fn symbol(&self) -> &'static str {
        NORMALIZE_SYMBOL
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters(&self) -> Parameters {
        self.settings.to_parameters()
    }

    fn set_parameters(&mut self, params: &Parameters) -> sonance_core::Result<()> {
        self.settings
            .apply_parameters(params)
            .map_err(|err| CoreError::invalid_parameter(NORMALIZE_SYMBOL, err.to_string()))
    }

    fn should_skip(&self, selection: Selection) -> bool {
        self.normalizer().should_skip(selection)
    }

    fn apply(
        &self,
        tracks: &mut [Track],
        selection: Selection,
        progress: &mut dyn ProgressReporter,
    ) -> sonance_core::Result<EffectOutcome> {
        let outcome = match self.normalizer().apply(tracks, selection, progress)? {
            ApplyOutcome::Completed(report) => EffectOutcome::Completed {
                message: Some(report.summary()),
            },
            ApplyOutcome::Skipped => EffectOutcome::Skipped,
            ApplyOutcome::Cancelled => EffectOutcome::Cancelled,
        };
        Ok(outcome)
    }
}

/// Register `Normalize` (with default settings) in `registry`
pub fn register(registry: &mut EffectRegistry) {
    registry.register(NormalizeEffect::factory(
        NormalizeSettings::default(),
        DEFAULT_BLOCK_SIZE,
    ));
}
