use std::path::Path;

use anyhow::Context;
use momentum_media::{check_ffmpeg, check_ffprobe};
use momentum_pipeline::PipelineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = PipelineConfig::from_env();
    let work_dir = config
        .work_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);

    println!(
        "momentum-selfcheck: starting with work_dir={}",
        work_dir.display()
    );
    ensure_workdir(&work_dir).await?;
    let ffmpeg = check_ffmpeg().context("ffmpeg not available")?;
    let ffprobe = check_ffprobe().context("ffprobe not available")?;
    println!(
        "momentum-selfcheck: ffmpeg={} ffprobe={}",
        ffmpeg.display(),
        ffprobe.display()
    );
    warn_if_missing("aubio");
    ensure_any_env_present(&["GEMINI_API_KEY", "MOMENTUM_AI_API_KEY"])?;

    println!("momentum-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| anyhow::anyhow!("work dir {} not creatable: {}", path.display(), e))?;
    Ok(())
}

fn warn_if_missing(name: &str) {
    if which::which(name).is_err() {
        println!(
            "momentum-selfcheck: warning: {} not found, beat detection will yield no beats",
            name
        );
    }
}

fn ensure_any_env_present(vars: &[&str]) -> anyhow::Result<()> {
    let present = vars
        .iter()
        .any(|var| std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false));
    if !present {
        return Err(anyhow::anyhow!(
            "missing required env var (one of {})",
            vars.join(", ")
        ));
    }
    Ok(())
}
