//! Post-processing of LLM replies

pub mod json;
