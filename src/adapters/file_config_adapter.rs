//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
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
[data]
path = ./data

[backtest]
symbol = BTC-USD
initial_balance = 10000.0

[strategy]
short_window = 20
long_window = 50
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbol"),
            Some("BTC-USD".to_string())
        );
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("./data".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol = BTC-USD\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nshort_window = 20\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "short_window", 0), 20);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nshort_window = abc\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "short_window", 42), 42);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_balance = 10000.5\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_balance", 0.0), 10000.5);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_double("backtest", "missing", 99.9), 99.9);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_balance = not_a_number\n")
                .unwrap();
        assert_eq!(adapter.get_double("backtest", "initial_balance", 99.9), 99.9);
    }

    #[test]
    fn get_bool_returns_true_values() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\na = true\nb = yes\nc = 1\n").unwrap();
        assert!(adapter.get_bool("backtest", "a", false));
        assert!(adapter.get_bool("backtest", "b", false));
        assert!(adapter.get_bool("backtest", "c", false));
    }

    #[test]
    fn get_bool_returns_false_values() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\na = false\nb = no\nc = 0\n").unwrap();
        assert!(!adapter.get_bool("backtest", "a", true));
        assert!(!adapter.get_bool("backtest", "b", true));
        assert!(!adapter.get_bool("backtest", "c", true));
    }

    #[test]
    fn get_bool_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert!(adapter.get_bool("backtest", "missing", true));
        assert!(!adapter.get_bool("backtest", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let content = "[sqlite]\npath = smacross.db\n";
        let file = create_temp_config(content);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("smacross.db".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }

    #[test]
    fn handles_all_config_sections() {
        let content = r#"
[data]
path = ./prices

[backtest]
symbol = BTC-USD
initial_balance = 25000.0
start = 2024-01-01
end = 2024-06-30

[strategy]
short_window = 10
long_window = 30

[sqlite]
path = runs.db
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();

        assert_eq!(
            adapter.get_string("data", "path"),
            Some("./prices".to_string())
        );
        assert_eq!(adapter.get_double("backtest", "initial_balance", 0.0), 25000.0);
        assert_eq!(adapter.get_int("strategy", "short_window", 0), 10);
        assert_eq!(adapter.get_int("strategy", "long_window", 0), 30);
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("runs.db".to_string())
        );
    }
}
