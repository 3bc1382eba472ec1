use std::sync::Arc;

use practices_mcp::{
    config::Config,
    library::{DocumentLibrary, Namespace},
    logging, stdio, AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_logging(&config.log_file)?;

    let library = Arc::new(DocumentLibrary::load(&config.docs_dir));
    info!(
        docs_dir = %config.docs_dir.display(),
        practices = library.count(Namespace::Practices),
        templates = library.count(Namespace::Templates),
        "document library loaded"
    );

    let state = AppState::new(library);
    stdio::run(state).await?;

    Ok(())
}
