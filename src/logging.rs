//! Logger setup.
//!
//! Desktop builds log to stderr through `fern` with local timestamps, Android builds go to
//! logcat.

use log::LevelFilter;

#[cfg(not(target_os = "android"))]
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

#[cfg(target_os = "android")]
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(level)
            .with_tag("gopher"),
    );
    Ok(())
}
