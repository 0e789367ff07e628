use lifelog_router::api::api_routes;
use lifelog_router::config::RouterConfig;
use lifelog_router::pipeline::queue::spawn_retry_task;
use lifelog_router::pipeline::rules::Classifier;
use lifelog_router::service::build_pipeline;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RouterConfig::from_env()?;

    // Initialize tracing; the guard flushes the file writer on exit
    let _log_guard = init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("classify") {
        let text = args[1..].join(" ");
        let routed = Classifier::new(config.timezone).classify(&text);
        println!("{}", serde_json::to_string_pretty(&routed)?);
        return Ok(());
    }

    eprintln!("📓 lifelog-router v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Notebook: {}", config.notebook);
    eprintln!("   Timezone: {}", config.timezone);
    eprintln!("   API: http://0.0.0.0:{}/api/log", config.port);
    if config.graph_token.is_none() {
        eprintln!("   Warning: GRAPH_ACCESS_TOKEN not set, page creation will fail");
    }

    let pipeline = build_pipeline(&config).await?;

    let _retry_handle = spawn_retry_task(
        pipeline.retries().clone(),
        pipeline.pages().clone(),
        config.retry_interval,
    );

    let app = api_routes(pipeline);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "HTTP server started");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &RouterConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "lifelog-router.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            None
        }
    }
}
