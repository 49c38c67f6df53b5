pub mod generation_session;
