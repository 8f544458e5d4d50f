pub mod wordlist;
pub mod product;
pub mod template;

pub use wordlist::{Axis, LoadedAxis, cap_from_limit, load_axis_soft, load_wordlist, parse_wordlist};
pub use product::{CandidateIter, CandidatePlan, CandidateSet, CandidateShape};
pub use template::{RequestTemplate, inject_query_param, query_parameters};
