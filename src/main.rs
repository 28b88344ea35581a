//! ThreadPulse Daily Engine
//!
//! Loads the puzzle bank, reports today's puzzle and plays a scripted
//! demo day through the session layer.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use threadpulse::{
    game::puzzle::PuzzleBank,
    session::{BroadcastHost, HostChannel, SessionManager},
    DayKey, EngineConfig, PlayerId, MAX_GUESSES, MAX_HINTS, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("ThreadPulse Daily Engine v{}", VERSION);
    info!("Guesses per day: {}, hints per puzzle: {}", MAX_GUESSES, MAX_HINTS);

    let config = EngineConfig::from_env();
    let bank = Arc::new(config.load_bank().context("Failed to load puzzle bank")?);
    let store = config.open_store().context("Failed to open store")?;

    let today = DayKey::from_instant(Utc::now());
    let selection = bank.selection_for(today);
    info!(
        "Today is {} (seed {}), puzzle #{} [{}]",
        selection.day_key, selection.seed, selection.index, selection.puzzle.id
    );

    verify_determinism(&bank, today)?;

    let host = Arc::new(BroadcastHost::default());
    let manager = SessionManager::new(
        bank.clone(),
        store,
        host.clone() as Arc<dyn HostChannel>,
        config.session_config(),
    );
    let mut events = host.subscribe();

    demo_day(&manager, &bank).await;

    while let Ok(event) = events.try_recv() {
        info!("Host event: {}", serde_json::to_string(&event)?);
    }

    info!("=== Demo Complete ===");
    Ok(())
}

/// Recompute the day's selection and check it never drifts.
fn verify_determinism(bank: &PuzzleBank, day_key: DayKey) -> anyhow::Result<()> {
    let first = bank.selection_for(day_key);
    let second = bank.selection_for(day_key);

    if first.index != second.index || first.seed != second.seed {
        anyhow::bail!(
            "DETERMINISM FAILURE for {}: index {} vs {}",
            day_key,
            first.index,
            second.index
        );
    }

    info!("✓ Determinism verified for {}", day_key);
    if let Some(next) = day_key.next_day() {
        let tomorrow = bank.selection_for(next);
        info!("Tomorrow ({}): puzzle #{} [{}]", next, tomorrow.index, tomorrow.puzzle.id);
    }
    Ok(())
}

/// Play one scripted day for a demo player.
async fn demo_day(manager: &SessionManager, bank: &PuzzleBank) {
    info!("=== Starting Demo Day ===");

    let player = PlayerId::from("demo-player");
    let start = Utc::now();
    let answer = bank.selection_at(start).puzzle.answer.clone();

    {
        let session = manager.session(&player, start).await;
        let session = session.lock().await;
        info!("Puzzle: {} ({})", session.puzzle().title, session.puzzle().category);
        for hint in session.visible_hints() {
            info!("Hint: {}", hint);
        }
    }

    match manager.submit_guess(&player, "definitely not it", start + Duration::seconds(20)).await {
        Ok(outcome) => info!("Wrong guess, {} remaining", outcome.guesses_remaining),
        Err(rejection) => warn!("Guess rejected: {}", rejection),
    }

    match manager.unlock_hint(&player, start + Duration::seconds(30)).await {
        Ok(unlocked) => info!("Unlocked hint {}", unlocked),
        Err(rejection) => warn!("Hint rejected: {}", rejection),
    }

    let solved_at = start + Duration::seconds(45);
    match manager.submit_guess(&player, &answer.to_uppercase(), solved_at).await {
        Ok(outcome) => info!(
            "Solved! score={} streak={} phase={:?}",
            outcome.score, outcome.streak, outcome.phase
        ),
        Err(rejection) => warn!("Guess rejected: {}", rejection),
    }

    match manager
        .submit_clue(&player, "Think about what the front page rewards", solved_at)
        .await
    {
        Ok(clue) => info!("Posted clue {}", clue.id),
        Err(rejection) => warn!("Clue rejected: {}", rejection),
    }

    for clue in manager.top_clues(DayKey::from_instant(solved_at)).await {
        info!("Top clue ({} pts): {}", clue.rank_score(), clue.text);
    }
}
