#![allow(dead_code)]

pub mod builders;
pub mod mock_generator;
pub mod strategies;

pub use builders::*;
pub use mock_generator::*;
