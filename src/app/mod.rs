// Application layer: concrete pipelines for each stage plus the verifier.

pub mod pipelines;
pub mod verifier;
