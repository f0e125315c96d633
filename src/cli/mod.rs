pub mod args;
pub mod validation;
