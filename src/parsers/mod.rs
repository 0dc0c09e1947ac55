//! Input parsing modules

pub mod link_parser;

pub use link_parser::*;
