pub mod candidate;
pub mod outcome;
pub mod report;
pub mod verdict;

pub use candidate::*;
pub use outcome::*;
pub use report::*;
pub use verdict::*;
