//! Retrieval core for an auditing-exam tutor: lexical search over audit
//! procedures, auditing standards and past exam questions, context assembly
//! for the LLM prompt, and int8 embedding quantization.

pub mod core;
pub mod rag;
pub mod server;
pub mod state;
