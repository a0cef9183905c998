// src/flows/mod.rs
pub mod classification;
pub mod codegen;

pub use classification::ClassificationFlow;
pub use codegen::CodeGenFlow;
