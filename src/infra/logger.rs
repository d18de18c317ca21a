use env_logger::Builder;
use log::Level;
use std::io::Write;

pub const LOG_LEVEL_ENV: &str = "REPO_TO_TEXT_LOG_LEVEL";

/// Maps the `-v` count to a level name. Skip diagnostics are logged at
/// `info`, so asking for them lifts the floor to `info`.
pub fn level_for(verbosity: u8, verbose_ignore: bool) -> &'static str {
    match verbosity {
        0 | 1 if verbose_ignore => "info",
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

pub fn setup_logger(verbosity: u8, verbose_ignore: bool) -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default()
        .filter_or(LOG_LEVEL_ENV, level_for(verbosity, verbose_ignore));

    Builder::from_env(env)
        .format(|buf, record| {
            let level_color = match record.level() {
                Level::Error => "31",
                Level::Warn => "33",
                Level::Info => "32",
                Level::Debug => "36",
                Level::Trace => "35",
            };

            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}",
                level_color,
                record.level(),
                buf.timestamp(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()
}
