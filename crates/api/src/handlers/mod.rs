pub mod generation;
pub mod oauth;
pub mod root;
pub mod session;
