use gvcnn::{ViewFeatures, ViewRecord, cli::GvcnnArgs, group_and_fuse};
use ortho_config::OrthoConfig;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn read_features(path: &Path) -> Result<Vec<ViewFeatures>, Box<dyn Error>> {
    let records: Vec<ViewRecord> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let features = records
        .into_iter()
        .map(ViewRecord::into_features)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(features)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = GvcnnArgs::load()?;
    let config = args.grouping_config()?;
    info!(
        num_groups = config.num_groups,
        num_views = config.num_views,
        policy = ?config.score_policy,
        "gvcnn starting"
    );

    // Without pre-extracted features there is nothing to group.
    let Some(path) = args.features_path.as_deref() else {
        return Ok(());
    };
    let features = read_features(path)?;
    let grouped = group_and_fuse(&features, &config)?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &grouped.trace())?;
    writeln!(stdout)?;
    Ok(())
}
