// ============================================
// src/main.rs (メインファイル)
// ============================================

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

// 出題データ
mod catalog;
use catalog::Catalog;

mod cli;
use cli::Args;

// 問題生成と正誤判定
mod engine;
use engine::QuizEngine;

mod plain;
mod session;
mod telemetry;
mod tui;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // カタログの検証は端末を触る前に済ませる
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => Catalog::builtin(),
    };

    if args.list {
        plain::print_groups(&catalog)?;
        return Ok(());
    }

    let log_path = args.log_file.clone().unwrap_or_else(telemetry::default_log_path);
    telemetry::init_tracing(&log_path)?;
    info!(
        groups = catalog.len(),
        seed = ?args.seed,
        plain = args.plain,
        "kanjiquiz starting"
    );

    if catalog.is_empty() {
        anyhow::bail!("the catalog has no groups");
    }

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut engine = QuizEngine::new(rng);

    if args.plain {
        plain::run(&catalog, &mut engine)?;
    } else {
        let mut app_state = tui::AppState::new(catalog, engine);
        tui::run(&mut app_state).context("terminal UI failed")?;
    }

    info!("kanjiquiz exiting");
    Ok(())
}
