use gvcnn::{GroupingConfig, GroupingTrace, ViewFeatures, group_and_fuse};
use ndarray::arr1;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Deserialize, Serialize)]
struct GoldenTrace {
    id: u32,
    num_groups: usize,
    logits: Vec<f32>,
    #[serde(flatten)]
    trace: GroupingTrace,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = PathBuf::from("tests/golden/traces.jsonl");
    let reader = BufReader::new(File::open(&path)?);
    let mut traces = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let gt: GoldenTrace = serde_json::from_str(&line)?;
        let config = GroupingConfig {
            num_groups: gt.num_groups,
            num_views: gt.logits.len(),
            ..GroupingConfig::default()
        };
        let features: Vec<ViewFeatures> = gt
            .logits
            .iter()
            .map(|&logit| ViewFeatures::new(arr1(&[logit]).into_dyn(), logit))
            .collect();
        let trace = group_and_fuse(&features, &config)?.trace();
        traces.push(GoldenTrace { trace, ..gt });
    }
    let mut writer = BufWriter::new(File::create(&path)?);
    for t in traces {
        serde_json::to_writer(&mut writer, &t)?;
        writeln!(&mut writer)?;
    }
    Ok(())
}
