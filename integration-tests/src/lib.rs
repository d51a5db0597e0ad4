//! Blackbox problems shared by the integration tests.

pub mod test_problems;
