pub mod generation_session_repo;

pub use generation_session_repo::GenerationSessionRepo;
