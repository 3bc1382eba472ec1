use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod errors;
pub mod library;
pub mod logging;
pub mod mcp;
pub mod stdio;

use library::DocumentLibrary;

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<DocumentLibrary>,
}

impl AppState {
    pub fn new(library: Arc<DocumentLibrary>) -> Self {
        Self { library }
    }
}
