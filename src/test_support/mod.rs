//! Shared helpers for unit tests that bind localhost sockets or inspect logs.

pub mod log_capture;
pub mod socket_guard;
