//! INI file configuration adapter.

use crate::domain::error::TradebotError;
use crate::ports::config_port::{ConfigPort, invalid_value};
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradebotError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TradebotError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TradebotError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradebotError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// An empty config, every lookup falls back to defaults.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TradebotError> {
        self.config.getfloat(section, key).map_err(|_| {
            let raw = self.get_string(section, key).unwrap_or_default();
            invalid_value(section, key, &raw, "a number")
        })
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TradebotError> {
        self.config.getint(section, key).map_err(|_| {
            let raw = self.get_string(section, key).unwrap_or_default();
            invalid_value(section, key, &raw, "an integer")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
initial_capital = 25000.0
commission_per_trade = 2

[strategy]
name = sma_crossover
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("strategy", "name"),
            Some("sma_crossover".to_string())
        );
        assert_eq!(
            adapter.get_double("backtest", "initial_capital").unwrap(),
            Some(25000.0)
        );
        assert_eq!(adapter.get_int("backtest", "commission_per_trade").unwrap(), Some(2));
    }

    #[test]
    fn missing_key_and_section_are_none() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_double("backtest", "missing").unwrap(), None);
        assert_eq!(adapter.get_int("paper", "days").unwrap(), None);
    }

    #[test]
    fn non_numeric_is_config_invalid() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = lots\n").unwrap();
        let err = adapter.get_double("backtest", "initial_capital").unwrap_err();
        match err {
            TradebotError::ConfigInvalid { section, key, reason } => {
                assert_eq!(section, "backtest");
                assert_eq!(key, "initial_capital");
                assert!(reason.contains("lots"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_integer_is_config_invalid() {
        let adapter = FileConfigAdapter::from_string("[paper]\ndays = 3.5\n").unwrap();
        assert!(matches!(
            adapter.get_int("paper", "days"),
            Err(TradebotError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn comma_lists_parse() {
        let adapter = FileConfigAdapter::from_string(
            "[heatmap]\ntake_profit_values = 1, 2.5 ,4\n",
        )
        .unwrap();
        assert_eq!(
            adapter.get_double_list("heatmap", "take_profit_values").unwrap(),
            Some(vec![1.0, 2.5, 4.0])
        );
        assert_eq!(adapter.get_double_list("heatmap", "other").unwrap(), None);
    }

    #[test]
    fn bad_list_item_is_config_invalid() {
        let adapter =
            FileConfigAdapter::from_string("[heatmap]\ntake_profit_values = 1,x,3\n").unwrap();
        assert!(adapter.get_double_list("heatmap", "take_profit_values").is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[logging]\nlevel = debug\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("logging", "level"), Some("debug".to_string()));
    }

    #[test]
    fn from_file_missing_is_config_parse() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(TradebotError::ConfigParse { .. })));
    }

    #[test]
    fn adapter_is_debug_printable() {
        let adapter = FileConfigAdapter::from_string("[paper]\ndays = 10\n").unwrap();
        assert!(format!("{adapter:?}").contains("FileConfigAdapter"));
    }

    #[test]
    fn empty_adapter_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("backtest", "initial_capital"), None);
    }
}
