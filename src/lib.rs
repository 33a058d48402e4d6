//! calckit - calculator utilities
//!
//! Safe evaluation of arithmetic expressions, unit conversion, number
//! formatting, and the small surfaces a calculator front end needs around
//! them: persistence, history, keyboard shortcuts and notifications.
//!
//! ```
//! use calckit::{evaluate, format_number, EvaluationResult};
//!
//! assert_eq!(evaluate("1+2*3"), EvaluationResult::Number(7.0));
//! assert_eq!(format_number(1234.56789, 2), "1234.57");
//! ```

pub mod calculator;
pub mod config;
pub mod format;
pub mod history;
pub mod keyboard;
pub mod notify;
pub mod storage;
pub mod units;

/// Directory name used under the platform config and data directories.
pub const APP_NAME: &str = "calckit";

pub use calculator::{
    CalcError, EvaluationResult, ValidationError, ValidationResult, evaluate, validate,
};
pub use config::Config;
pub use format::{DEFAULT_PRECISION, format_grouped, format_number};
pub use history::{History, HistoryEntry};
pub use keyboard::{KeyChord, KeyboardDispatcher};
pub use notify::{Notification, NotificationKind, Notifier, ToastQueue};
pub use storage::Storage;
pub use units::{ConversionError, convert_unit};
