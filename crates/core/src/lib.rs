//! Domain logic for the DJ persona backend.
//!
//! Everything in this crate is pure: persona synthesis from listening
//! data, prompt templating, and the naming rules shared by the API and the
//! image generator. No I/O happens here.

pub mod error;
pub mod naming;
pub mod persona;
pub mod prompts;
pub mod types;
