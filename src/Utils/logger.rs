//! logger set up once at start-up from the `logging` section of the settings
use crate::Utils::settings_parser::LoggingSettings;
use crate::errors::{CalcError, CalcResult};
use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;

pub fn level_filter(loglevel: &str) -> CalcResult<LevelFilter> {
    match loglevel {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        _ => Err(CalcError::Settings(format!(
            "loglevel must be debug, info, warn, error or off, got {}",
            loglevel
        ))),
    }
}

/// Terminal logger plus, when `log_to_file` is set, a `log_<date_and_time>.txt` file.
/// A second call keeps the logger of the first one.
pub fn init_logger(settings: &LoggingSettings) -> CalcResult<()> {
    let log_option = level_filter(&settings.loglevel)?;
    if log_option == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if settings.log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        loggers.push(WriteLogger::new(log_option, Config::default(), File::create(&name)?));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            info!("Program started with loglevel: {}", log_option);
        }
        Err(e) => {
            eprintln!("logger already initialized: {}", e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(level_filter("none").unwrap(), LevelFilter::Off);
        assert!(level_filter("verbose").is_err());
    }

    #[test]
    fn test_second_init_is_not_an_error() {
        let settings = LoggingSettings {
            loglevel: "error".to_string(),
            log_to_file: false,
        };
        assert!(init_logger(&settings).is_ok());
        assert!(init_logger(&settings).is_ok());
    }
}
