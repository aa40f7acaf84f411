pub mod constants;
mod core;

pub use self::core::{Candidate, CandidateGenerator, CandidateKind};

#[cfg(test)]
mod tests;
