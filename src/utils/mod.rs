//! Host-side tooling for recorded sessions.

pub mod session_reader;
