#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

mod error;
pub mod health;
pub mod model;
pub mod sse;
pub mod wire;

pub use error::RuntimeError;
pub use health::readiness_from_status;
pub use model::LlamaServerModel;
