// Core algorithm exports
pub mod engine;
pub mod filters;
pub mod premium;
pub mod scoring;

pub use engine::{pair, request_match, unpair};
pub use filters::can_match;
pub use scoring::{interest_overlap, shared_interests};
