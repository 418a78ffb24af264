use hookgate::{App, ConfigBuilder};

#[tokio::main]
async fn main() {
    // Fail closed: a missing or empty secret refuses to serve at all
    let config = match ConfigBuilder::new().from_env().build() {
        Ok(config) => config,
        Err(e) => {
            hookgate::init_tracing();
            tracing::error!(error = %e, "Refusing to start with invalid configuration");
            std::process::exit(1);
        }
    };

    hookgate::init_tracing_with_config(&config);

    if let Err(e) = App::with_config(config).serve().await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
