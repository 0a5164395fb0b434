use std::io;
use std::sync::Arc;

pub mod app;
pub mod domain;
pub mod infra;
pub mod runtime;
pub mod ui;

// Re-exports for embedders and convenience
pub use app::App;
pub use infra::config::ArgonautConfig;
pub use infra::service::GitopsService;

use crate::domain::server::ServerDescriptor;

/// Runs the full TUI against any control-plane service implementation.
///
/// The server descriptor is taken from `config`; when no server and
/// token are configured the app starts in Login mode.
///
/// # Errors
/// Returns an error if terminal setup, rendering, or event processing
/// fails.
pub async fn run(service: Arc<dyn GitopsService>, config: ArgonautConfig) -> io::Result<()> {
    let descriptor = match (&config.server, &config.token) {
        (Some(server), Some(token)) => {
            let mut descriptor = ServerDescriptor::new(server.clone(), token.clone());
            descriptor.insecure = config.insecure;

            Some(descriptor)
        }
        _ => None,
    };

    let (mut app, messages) = App::new(service, config);
    if let Some(descriptor) = descriptor {
        app.set_server(descriptor);
    }

    runtime::run(&mut app, messages).await
}
