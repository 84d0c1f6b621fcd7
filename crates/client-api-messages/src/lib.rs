//! Wire and file formats shared between the GerTaxLaw benchmark kit and the
//! grading server.
//!
//! The server owns scoring and aggregation. Everything here is plain data:
//! the published question set, the predictions file a participant uploads,
//! and the JSON bodies the submission endpoints answer with.

pub mod http;
pub mod predictions;
pub mod question;

pub use predictions::Predictions;
pub use question::{Question, QuestionId, QuestionSet, QuestionSetError};
