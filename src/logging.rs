use std::str::FromStr;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::errors::ConfigError;
use crate::initialization::General;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}";

/// Sets up log4rs with a console appender and, if a path is given, a file appender
///
/// # Arguments
///
/// * 'general' - general configuration holding log path, level and stdout flag
pub fn setup_logger(general: &General) -> Result<(), ConfigError> {
    let level = parse_level(&general.log_level)?;

    let mut builder = Config::builder();
    let mut root = Root::builder();

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    if let Some(log_path) = &general.log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = builder.build(root.build(level))?;
    log4rs::init_config(config)?;

    Ok(())
}

/// Parses a log level name such as "info" or "debug"
///
/// # Arguments
///
/// * 'level' - level name, case insensitive
fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| ConfigError(format!("unknown log level '{}'", level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" off ").unwrap(), LevelFilter::Off);
        assert!(parse_level("loud").is_err());
    }
}
