pub mod error_handler;
pub mod misc;

pub use error_handler::AppError;
pub use misc::*;
