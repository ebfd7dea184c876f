use futures::StreamExt;
use imagen_queue::{
    AspectRatio, AuthProvider, DemoIdentityProvider, GeminiConfig, GeminiProvider, HistoryStatus,
    IdentityProvider, ImageModel, ImageProvider, ImageQueue, PipelineEvent, PlaceholderProvider,
    PromptInput, QueueConfig, SubmitError,
};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    let dotenv_loaded = dotenv::dotenv().is_ok();

    imagen_queue::logger::init_with_config(imagen_queue::logger::LoggerConfig::development())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let prompts: Vec<String> = env::args().skip(1).collect();
    if prompts.is_empty() {
        log::error!("❌ Usage: imagen-queue <prompt> [<prompt> ...]");
        log::info!("   IMAGEN_ASPECT_RATIO=1:1|3:4|16:9 and IMAGEN_MODEL=flash|pro are optional");
        return Ok(());
    }

    let config = QueueConfig::from_env()?;

    log::info!("🖼️  Available image generation models:");
    for (id, name, provider) in ImageModel::supported_models() {
        log::info!("  {} - {} ({})", id, name, provider);
    }

    log::info!("📐 Supported aspect ratios:");
    for ratio in AspectRatio::ALL {
        let (width, height) = ratio.dimensions();
        log::info!("  {} - {}x{}", ratio.label(), width, height);
    }

    let provider: Arc<dyn ImageProvider> = match GeminiProvider::new(GeminiConfig::from_env()) {
        Ok(gemini) => {
            log::info!("✅ Gemini API key found");
            Arc::new(gemini)
        }
        Err(e) => {
            log::warn!("⚠️  {}; falling back to placeholder images", e);
            Arc::new(PlaceholderProvider::new())
        }
    };

    let queue = ImageQueue::from_provider(config, provider);

    let settings = queue.config();
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Queue capacity: {}", settings.max_queue_size);
    log::info!("   Debounce: {}ms", settings.debounce.as_millis());
    log::info!(
        "   Retries: {} (initial backoff {}ms)",
        settings.retry.max_retries,
        settings.retry.initial_backoff.as_millis()
    );

    let user = DemoIdentityProvider::new()
        .authenticate(AuthProvider::Google)
        .await?;
    queue.sign_in(user);
    if let Some(user) = queue.user() {
        log::info!("👤 Signed in as {} <{}>", user.name, user.email);
    }

    let mut events = queue.subscribe();
    let progress = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                PipelineEvent::Started { id } => log::info!("🎨 Generating {}", id),
                PipelineEvent::Completed { id } => log::info!("✅ Finished {}", id),
                PipelineEvent::Failed { id, error } => log::error!("❌ {} failed: {}", id, error),
                _ => {}
            }
        }
    });

    let aspect_ratio = env::var("IMAGEN_ASPECT_RATIO").unwrap_or_else(|_| "1:1".to_string());
    let model = env::var("IMAGEN_MODEL").ok();

    for prompt in prompts {
        let mut input = PromptInput::new(prompt, aspect_ratio.clone());
        if let Some(model) = &model {
            input = input.with_model(model.clone());
        }

        loop {
            match queue.submit(input.clone()) {
                Ok(request) => {
                    log::info!("📥 Queued {}: \"{}\"", request.id, request.prompt);
                    break;
                }
                Err(SubmitError::Admission(imagen_queue::AdmissionError::RateLimited {
                    retry_after,
                })) => {
                    tokio::time::sleep(retry_after).await;
                }
                Err(SubmitError::Admission(imagen_queue::AdmissionError::QueueFull { .. })) => {
                    log::warn!("⏳ Queue is full, waiting for it to drain");
                    queue.wait_idle().await;
                }
                Err(e) => {
                    log::error!("❌ Rejected \"{}\": {}", input.prompt, e);
                    break;
                }
            }
        }
    }

    queue.wait_idle().await;
    progress.abort();

    let history = queue.history();
    let completed = history
        .iter()
        .filter(|entry| entry.status == HistoryStatus::Completed)
        .count();
    log::info!(
        "📊 {} request(s): {} completed, {} failed",
        history.len(),
        completed,
        history.len() - completed
    );

    println!("{}", serde_json::to_string_pretty(&queue.snapshot())?);

    Ok(())
}
