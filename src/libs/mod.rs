//! Presentation-layer helpers shared by the demo CLI.

pub mod messages;
