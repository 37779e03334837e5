use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use ytlive_core::{
    evaluate, spawn_feedback_poller, ActionEvent, BroadcastCache, CompanionConfig, EnvToken,
    FeedbackKind, SyncEngine, YouTubeApi,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CompanionConfig::load();
    let credentials = EnvToken::new(config.api.access_token_env.clone());
    let api = match YouTubeApi::from_config(&config.api, credentials) {
        Ok(api) => Arc::new(api),
        Err(err) => {
            error!(error = %err, "failed to initialise YouTube client");
            return;
        }
    };

    let engine = SyncEngine::new(api, BroadcastCache::new())
        .with_reload_after_transition(config.refresh.reload_after_transition);
    if let Err(err) = engine.reload().await {
        warn!(error = %err, "initial broadcast query failed");
    } else {
        info!("YouTube module initialized successfully");
    }

    let poller = spawn_feedback_poller(engine.clone(), config.refresh.feedback_interval());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                error!(error = %err, "failed to read command");
                break;
            }
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let argument = words.next();

        match command {
            "quit" | "exit" => break,
            "actions" => {
                for action in engine.actions().await {
                    let targets = action
                        .options
                        .first()
                        .map(|o| o.choices.len())
                        .unwrap_or_default();
                    println!("{:<18} {} ({} targets)", action.id, action.label, targets);
                }
            }
            "status" | "health" => {
                let kind = if command == "status" {
                    FeedbackKind::BroadcastStatus
                } else {
                    FeedbackKind::StreamHealth
                };
                let memory = engine.cache().snapshot().await;
                match evaluate(kind, argument, &memory, &config.feedback) {
                    Some(style) => println!("{}", style.text),
                    None => println!("-"),
                }
            }
            action => {
                let event = ActionEvent::new(action, argument);
                match engine.handle(&event).await {
                    Ok(()) => info!(action, "action completed"),
                    Err(err) => warn!(action, error = %err, "action failed"),
                }
            }
        }
    }

    if let Err(err) = poller.stop().await {
        warn!(error = %err, "feedback poller did not stop cleanly");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
