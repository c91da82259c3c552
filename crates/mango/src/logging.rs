use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::path::Path;

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Keep only the newer half of the log once it outgrows `max_log_size`.
fn trim_if_oversized(log_path: &Path, max_log_size: u64) {
    if let Ok(metadata) = std::fs::metadata(log_path)
        && metadata.len() > max_log_size
        && let Ok(contents) = std::fs::read(log_path)
    {
        let half = contents.len() / 2;
        let keep_from = contents[half..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(half, |pos| half + pos + 1);
        let _ = std::fs::write(log_path, &contents[keep_from..]);
    }
}

/// File logging follows the `debug_logging` setting; `--verbose` mirrors the
/// same records to stderr. With neither, logging is off.
pub fn init_logging(log_path: &Path, debug_enabled: bool, verbose: bool, max_log_size: u64) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("mango")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if debug_enabled {
        trim_if_oversized(log_path, max_log_size);
        if let Ok(file) = open_log_file(log_path) {
            loggers.push(WriteLogger::new(LevelFilter::Debug, config.clone(), file));
        }
    }

    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Debug,
            config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    if loggers.is_empty() {
        log::set_max_level(LevelFilter::Off);
        return;
    }

    let _ = CombinedLogger::init(loggers);

    if debug_enabled {
        log::info!("Debug logging initialized, log file: {}", log_path.display());
    }
}
