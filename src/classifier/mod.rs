pub mod predicate;
pub mod baseline;
pub mod indicators;

pub use predicate::{SuccessPredicate, StatusRange, classify, DEFAULT_LEN_THRESHOLD_PCT};
pub use baseline::{Baseline, BaselineMode};
pub use indicators::InjectionKind;
