//! The discovery form: step machine, validation rules, and the async driver.

pub mod driver;
pub mod machine;
pub mod validate;

pub use driver::SessionDriver;
pub use machine::{Effect, FormSession, StepEvent, StepState, SubmissionStatus};
pub use validate::validate_answer;
