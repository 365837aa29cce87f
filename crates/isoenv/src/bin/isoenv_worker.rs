//! Worker-process entry serving the builtin environment registry over stdio.

use isoenv::EnvRegistry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    isoenv::init_worker_logging();
    let registry = EnvRegistry::with_builtins();
    isoenv::serve_stdio(&registry).await
}
