//! Configuration access port trait.

use crate::domain::error::TradebotError;

/// Key/value configuration grouped in sections.
///
/// Absent keys are `Ok(None)`; present but malformed values are
/// [`TradebotError::ConfigInvalid`].
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TradebotError> {
        self.get_string(section, key)
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| invalid_value(section, key, &raw, "a number"))
            })
            .transpose()
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TradebotError> {
        self.get_string(section, key)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| invalid_value(section, key, &raw, "an integer"))
            })
            .transpose()
    }

    /// Comma-separated numbers. An empty value is an empty list.
    fn get_double_list(
        &self,
        section: &str,
        key: &str,
    ) -> Result<Option<Vec<f64>>, TradebotError> {
        let Some(raw) = self.get_string(section, key) else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse::<f64>()
                    .map_err(|_| invalid_value(section, key, item, "a number"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

pub(crate) fn invalid_value(section: &str, key: &str, raw: &str, expected: &str) -> TradebotError {
    TradebotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("expected {}, got '{}'", expected, raw.trim()),
    }
}
