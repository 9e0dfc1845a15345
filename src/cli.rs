use crate::anim::diff_scenes;
use crate::config::{Config, load_config};
use crate::ir::ChartSpec;
use crate::layout::{LayoutOutput, Rect, compute_layout};
use crate::scene_dump::{PlanDump, SceneDump};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mxc", version, about = "Matrix chart layout engine")]
pub struct Args {
    /// Chart options file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout dump. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Tuning config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Canvas height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Second options file; emits the animation plan carrying the first
    /// scene into this one instead of a layout dump.
    #[arg(long = "diff")]
    pub diff: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunDump {
    scene: SceneDump,
    events: Vec<crate::events::ChartEvent>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let canvas = Rect::new(0.0, 0.0, args.width, args.height);

    let spec = read_spec(args.input.as_deref())?;
    spec.validate()?;
    let LayoutOutput { scene, events } =
        compute_layout(&spec, canvas, &config.theme, &config.layout);

    let json = if let Some(diff_path) = &args.diff {
        let next = load_spec_file(diff_path)?;
        next.validate()?;
        let next_output = compute_layout(&next, canvas, &config.theme, &config.layout);
        let plan = diff_scenes(
            &scene,
            &next_output.scene,
            next.animation_duration,
            &config.layout.animation,
        );
        serde_json::to_string_pretty(&PlanDump::from_plan(&plan))?
    } else {
        serde_json::to_string_pretty(&RunDump {
            scene: SceneDump::from_scene(&scene),
            events,
        })?
    };

    write_output(&json, args.output.as_deref())
}

fn read_spec(path: Option<&Path>) -> Result<ChartSpec> {
    match path {
        Some(path) if path != Path::new("-") => load_spec_file(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            parse_spec(&buf)
        }
    }
}

fn load_spec_file(path: &Path) -> Result<ChartSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading chart options from {}", path.display()))?;
    parse_spec(&contents)
}

// json5 accepts plain JSON too, so one parser covers both extensions.
fn parse_spec(contents: &str) -> Result<ChartSpec> {
    json5::from_str(contents).context("parsing chart options")
}

fn write_output(json: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Shared by the CLI and the integration suite.
pub fn layout_from_str(contents: &str, canvas: Rect, config: &Config) -> Result<LayoutOutput> {
    let spec = parse_spec(contents)?;
    spec.validate()?;
    Ok(compute_layout(&spec, canvas, &config.theme, &config.layout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json5_options_parse() {
        let spec = parse_spec(
            r#"{
                // comments are fine in options files
                rows: [{id: "r1"}],
                columns: [{id: "c1"}],
                groupBehavior: "withinCell",
            }"#,
        )
        .expect("json5 options should parse");
        assert_eq!(spec.rows.len(), 1);
    }

    #[test]
    fn strict_json_options_parse() {
        let spec =
            parse_spec(r#"{"rows": [{"id": "r1"}], "columns": [{"id": "c1"}]}"#).expect("json");
        assert_eq!(spec.columns.len(), 1);
    }

    #[test]
    fn malformed_options_are_rejected() {
        assert!(parse_spec("{rows: }").is_err());
    }
}
