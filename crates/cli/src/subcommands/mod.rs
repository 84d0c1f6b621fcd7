pub mod generate;
pub mod questions;
pub mod status;
pub mod submit;
pub mod validate;
