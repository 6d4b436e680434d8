//! Normalization settings and their named parameters

use crate::error::{NormalizeError, Result};
use crate::{db_to_linear, DEFAULT_PEAK_LEVEL_DB, MAX_PEAK_LEVEL_DB, MIN_PEAK_LEVEL_DB};
use serde::{Deserialize, Serialize};
use sonance_core::{ParamValue, Parameters};

/// Named parameters understood by the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    /// Target peak level in dBFS
    PeakLevel,
    /// Scale the selection so its peak reaches the target level
    ApplyGain,
    /// Subtract the mean of each channel
    RemoveDcOffset,
    /// Derive a separate gain for every channel
    StereoIndependent,
}

impl ParamKey {
    /// Every key, in parameter-string order
    pub const ALL: [Self; 4] = [
        Self::PeakLevel,
        Self::ApplyGain,
        Self::RemoveDcOffset,
        Self::StereoIndependent,
    ];

    /// Parameter name as it appears in parameter strings
    pub fn name(self) -> &'static str {
        match self {
            Self::PeakLevel => "PeakLevel",
            Self::ApplyGain => "ApplyGain",
            Self::RemoveDcOffset => "RemoveDcOffset",
            Self::StereoIndependent => "StereoIndependent",
        }
    }

    /// Look up a key by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Settings for one normalization run
///
/// Immutable for the duration of an apply; hosts edit a copy through
/// `set_param` or plain field access and hand it to `Normalizer::new`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeSettings {
    /// Target peak level in dBFS (`-145.0..=0.0`)
    pub peak_level_db: f64,
    /// Scale the selection so its peak reaches `peak_level_db`
    pub apply_gain: bool,
    /// Subtract the mean of each channel before scaling
    pub remove_dc: bool,
    /// Derive a separate gain for every channel instead of one per track
    pub stereo_independent: bool,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            peak_level_db: DEFAULT_PEAK_LEVEL_DB,
            apply_gain: true,
            remove_dc: true,
            stereo_independent: false,
        }
    }
}

impl NormalizeSettings {
    /// Check that the target level is usable
    pub fn validate(&self) -> Result<()> {
        validate_level(self.peak_level_db)
    }

    /// Check whether these settings request no correction at all
    pub fn is_noop(&self) -> bool {
        !self.apply_gain && !self.remove_dc
    }

    /// Target peak as a linear amplitude
    pub fn target_amplitude(&self) -> f64 {
        db_to_linear(self.peak_level_db)
    }

    /// Read a parameter by name
    pub fn get_param(&self, name: &str) -> Option<ParamValue> {
        let value = match ParamKey::from_name(name)? {
            ParamKey::PeakLevel => ParamValue::Float(self.peak_level_db),
            ParamKey::ApplyGain => ParamValue::Bool(self.apply_gain),
            ParamKey::RemoveDcOffset => ParamValue::Bool(self.remove_dc),
            ParamKey::StereoIndependent => ParamValue::Bool(self.stereo_independent),
        };
        Some(value)
    }

    /// Write a parameter by name
    ///
    /// Text values are parsed; the level is range-checked. On error the
    /// settings are unchanged.
    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        let key = ParamKey::from_name(name)
            .ok_or_else(|| NormalizeError::InvalidSettings(format!("unknown parameter '{}'", name)))?;
        let value = value.into();

        match key {
            ParamKey::PeakLevel => {
                let db = value.as_f64().ok_or_else(|| type_error(key, &value, "a number"))?;
                validate_level(db)?;
                self.peak_level_db = db;
            }
            ParamKey::ApplyGain => {
                self.apply_gain = value.as_bool().ok_or_else(|| type_error(key, &value, "a boolean"))?;
            }
            ParamKey::RemoveDcOffset => {
                self.remove_dc = value.as_bool().ok_or_else(|| type_error(key, &value, "a boolean"))?;
            }
            ParamKey::StereoIndependent => {
                self.stereo_independent =
                    value.as_bool().ok_or_else(|| type_error(key, &value, "a boolean"))?;
            }
        }
        Ok(())
    }

    /// Every parameter in string-transport form
    pub fn to_parameters(&self) -> Parameters {
        ParamKey::ALL
            .into_iter()
            .fold(Parameters::new(), |params, key| match self.get_param(key.name()) {
                Some(value) => params.with(key.name(), value),
                None => params,
            })
    }

    /// Apply every parameter in `params`; absent keys keep their value
    ///
    /// All-or-nothing: on error the settings are unchanged.
    pub fn apply_parameters(&mut self, params: &Parameters) -> Result<()> {
        let mut updated = *self;
        for (name, value) in params.iter() {
            updated.set_param(name, value.clone())?;
        }
        *self = updated;
        Ok(())
    }

    /// Build settings from defaults overridden by `params`
    pub fn from_parameters(params: &Parameters) -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_parameters(params)?;
        Ok(settings)
    }
}

fn validate_level(db: f64) -> Result<()> {
    if !db.is_finite() || !(MIN_PEAK_LEVEL_DB..=MAX_PEAK_LEVEL_DB).contains(&db) {
        return Err(NormalizeError::InvalidSettings(format!(
            "peak level {} dB is outside {}..={} dB",
            db, MIN_PEAK_LEVEL_DB, MAX_PEAK_LEVEL_DB
        )));
    }
    Ok(())
}

fn type_error(key: ParamKey, value: &ParamValue, expected: &str) -> NormalizeError {
    NormalizeError::InvalidSettings(format!(
        "{} must be {}, got '{}'",
        key.name(),
        expected,
        value
    ))
}
