//! Domain records and the error taxonomy shared by the client core and the
//! admin binaries.

pub mod domain;
pub mod error;
