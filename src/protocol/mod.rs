//! Host protocol handling.
//!
//! Parsing for the line-oriented command protocol the engine binary speaks,
//! and JSON scenario files for bulk world setup.

pub mod parser;
pub mod scenario;

pub use parser::{parse_command, Command, ParseError};
pub use scenario::{Scenario, ScenarioError};
