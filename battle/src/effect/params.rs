//! Parsing of free-form side-effect argument strings

use skirmish_protocol::Stat;

use crate::types::StatusKind;

/// Numeric arguments split from a skill's `sideEffectArg` string.
///
/// Values are separated by whitespace, commas or semicolons. Builders pull
/// typed values out by position; any error surfaces as a config failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectArgs {
    values: Vec<i64>,
}

impl EffectArgs {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let values = raw
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|_| format!("'{part}' is not a number"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn int(&self, idx: usize, name: &str) -> Result<i64, String> {
        self.values
            .get(idx)
            .copied()
            .ok_or_else(|| format!("missing argument {idx} ({name})"))
    }

    pub fn int_or(&self, idx: usize, default: i64) -> i64 {
        self.values.get(idx).copied().unwrap_or(default)
    }

    fn ranged(&self, value: i64, low: i64, high: i64, name: &str) -> Result<i64, String> {
        if (low..=high).contains(&value) {
            Ok(value)
        } else {
            Err(format!("{name} = {value} is outside {low}..={high}"))
        }
    }

    /// Percent in 0..=100
    pub fn percent(&self, idx: usize, name: &str) -> Result<u8, String> {
        let value = self.int(idx, name)?;
        Ok(self.ranged(value, 0, 100, name)? as u8)
    }

    pub fn percent_or(&self, idx: usize, default: u8, name: &str) -> Result<u8, String> {
        let value = self.int_or(idx, default as i64);
        Ok(self.ranged(value, 0, 100, name)? as u8)
    }

    /// Turn count in 1..=255
    pub fn turns(&self, idx: usize, name: &str) -> Result<u8, String> {
        let value = self.int(idx, name)?;
        Ok(self.ranged(value, 1, u8::MAX as i64, name)? as u8)
    }

    pub fn turns_or(&self, idx: usize, default: u8, name: &str) -> Result<u8, String> {
        let value = self.int_or(idx, default as i64);
        Ok(self.ranged(value, 1, u8::MAX as i64, name)? as u8)
    }

    /// Unsigned magnitude with an upper bound
    pub fn amount(&self, idx: usize, max: u32, name: &str) -> Result<u32, String> {
        let value = self.int(idx, name)?;
        Ok(self.ranged(value, 0, max as i64, name)? as u32)
    }

    /// Stage delta in -6..=6 (zero rejected)
    pub fn stage_delta(&self, idx: usize, name: &str) -> Result<i8, String> {
        let value = self.int(idx, name)?;
        if value == 0 {
            return Err(format!("{name} must not be zero"));
        }
        Ok(self.ranged(value, -6, 6, name)? as i8)
    }

    /// Stat axis index (0 atk .. 5 accuracy)
    pub fn stat(&self, idx: usize) -> Result<Stat, String> {
        let value = self.int(idx, "stat")?;
        usize::try_from(value)
            .ok()
            .and_then(Stat::from_index)
            .ok_or_else(|| format!("unknown stat index {value}"))
    }

    /// Status slot index (0..20)
    pub fn status(&self, idx: usize) -> Result<StatusKind, String> {
        let value = self.int(idx, "status")?;
        u8::try_from(value)
            .ok()
            .and_then(StatusKind::from_id)
            .ok_or_else(|| format!("unknown status id {value}"))
    }
}
