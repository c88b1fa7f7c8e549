//! MedAssist HTTP API

pub mod server;
pub mod sessions;

pub use server::{build_router, start_server, AppState, DiseaseResponse, WELCOME_MESSAGE};
pub use sessions::{RegistryError, SessionRegistry, SessionView};
