pub mod health;
pub mod rag;
