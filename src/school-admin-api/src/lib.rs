//! Client for the school-management REST backend used by the admin console.
//!
//! Every endpoint answers with a `{ success, data?, message? }` envelope; the
//! client validates that shape and maps each failure mode onto
//! [`ApiError`].

#[cfg(target_arch = "wasm32")]
mod browser;
mod client;
mod envelope;
mod error;
pub mod fields;
mod models;

#[cfg(test)]
mod tests;

pub use client::AdminApi;
pub use envelope::{Ack, Envelope};
pub use error::{ApiError, Result};
pub use models::{
    session_from_value, ClassOption, FileData, MemorizationScheme, NewStudent, SchemeQuery, StatusUpdate,
    Student, StudentStatus, UploadFile, VideoUpload,
};
