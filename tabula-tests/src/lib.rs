mod grades;
mod invalid;
mod logs;
#[cfg(not(feature = "disable-transactions"))]
mod transaction;
mod truncate;
mod users;

pub use grades::grades;
pub use invalid::invalid;
pub use logs::logs;
#[cfg(not(feature = "disable-transactions"))]
pub use transaction::transaction;
pub use truncate::truncate;
pub use users::users;

use log::LevelFilter;
use std::env;
use tabula::Connection;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every collection scenario against `connection`.
pub async fn execute_tests<C: Connection>(connection: C) {
    users(&connection).await;
    grades(&connection).await;
    logs(&connection).await;
    invalid(&connection).await;
    truncate(&connection).await;
    #[cfg(not(feature = "disable-transactions"))]
    transaction(&connection).await;
}

/// Evaluates the code with logging turned off, for failures a test provokes on purpose.
#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        let result = { $($code)+ };
        log::set_max_level(level);
        result
    }};
}
