pub mod config;
pub mod data;
pub mod storage;
pub mod repository;
pub mod identity;
pub mod logging;
pub mod rng;
pub mod util;
pub mod bin_constants;
mod lib_constants;

#[doc(hidden)]
pub use log as __log;

#[macro_export]
macro_rules! error_exit {
    ($($arg:tt)+) => ({
        $crate::__log::error!($($arg)+);
        ::std::process::exit(1)
    });
}
