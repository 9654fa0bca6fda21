//! Small helpers shared by the wire and domain types.

pub mod time;
