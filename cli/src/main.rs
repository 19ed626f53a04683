//! A command-line driver for the road network engine. Reads RoadSpecs as JSON, rebuilds the
//! network, and writes the result as JSON and optionally GeoJSON.

#[macro_use]
extern crate log;

mod geojson_export;

use anyhow::Result;
use structopt::StructOpt;

use road_network::{Config, RoadSpec};

#[derive(StructOpt)]
#[structopt(name = "roadgeom", about = "Builds road and junction surfaces from road polylines")]
enum Command {
    /// Rebuild the whole network from a JSON list of RoadSpecs
    Rebuild {
        /// The path to a JSON list of RoadSpecs
        #[structopt(long)]
        input: String,
        /// The path to a JSON Config. Missing fields take their defaults, and omitting the file
        /// entirely uses the default config.
        #[structopt(long)]
        config: Option<String>,
        /// The path to write the full result as JSON
        #[structopt(long)]
        output: String,
        /// Also write every piece and junction surface as a GeoJSON FeatureCollection here
        #[structopt(long)]
        geojson: Option<String>,
        /// Record intermediate geometry in the result. With --geojson, it's exported too.
        #[structopt(long)]
        trace: bool,
    },
    /// Check RoadSpecs without building anything, printing every problem found
    Validate {
        /// The path to a JSON list of RoadSpecs
        #[structopt(long)]
        input: String,
        /// The path to a JSON Config
        #[structopt(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    match Command::from_args() {
        Command::Rebuild {
            input,
            config,
            output,
            geojson,
            trace,
        } => rebuild(input, config, output, geojson, trace),
        Command::Validate { input, config } => validate(input, config),
    }
}

fn load(input: &str, config: Option<String>) -> Result<(Vec<RoadSpec>, Config)> {
    let specs: Vec<RoadSpec> = abstutil::read_json(input)?;
    let cfg = match config {
        Some(path) => abstutil::read_json(&path)?,
        None => Config::default(),
    };
    Ok((specs, cfg))
}

fn rebuild(
    input: String,
    config: Option<String>,
    output: String,
    geojson: Option<String>,
    trace: bool,
) -> Result<()> {
    let (specs, mut cfg) = load(&input, config)?;
    if trace {
        cfg.record_trace = true;
    }
    info!("Rebuilding {} roads from {}", specs.len(), input);
    let result = road_network::rebuild(&specs, &cfg)?;
    abstutil::write_json(&output, &result)?;
    if let Some(path) = geojson {
        geojson_export::write(&path, &result)?;
    }
    if !result.warnings.is_empty() {
        warn!("{} warnings; see {}", result.warnings.len(), output);
    }
    Ok(())
}

fn validate(input: String, config: Option<String>) -> Result<()> {
    let (specs, cfg) = load(&input, config)?;
    cfg.validate()?;
    let warnings = road_network::validate_specs(&specs, &cfg);
    for w in &warnings {
        println!("{}", w);
    }
    println!(
        "{} roads, {} problems",
        abstutil::prettyprint_usize(specs.len()),
        abstutil::prettyprint_usize(warnings.len())
    );
    Ok(())
}
