use evlog::Logger;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Installs the process-wide logger. Only the first call takes effect.
pub fn set_logger(logger: Logger) {
    if LOGGER.set(logger).is_err() {
        get_logger().debug("Logger was already installed; ignoring replacement.", evlog::meta! {
            "Component" => "runtime",
        });
    }
}

/// Returns the installed logger, or a logger with no printers if none was installed.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(Logger::default)
}
