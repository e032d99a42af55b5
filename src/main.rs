use std::error::Error;
use std::io;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use log::info;
use spgemm_cob::cmd_args::Args;
use spgemm_cob::settings::Settings;
use spgemm_cob::transport::{FrameReader, RecordWriter};
use spgemm_cob::{CobEngine, CobResult, PartialProducts, System};

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::init_with_level(log::Level::Info)?;

    let args = Args::parse();
    if let Some(shell) = args.generator {
        let mut cmd = Args::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, bin_name, &mut io::stdout());
        return Ok(());
    }

    // defaults first, files named on the command line override them
    let mut config_names = vec![String::from("configs/default.toml")];
    config_names.extend(args.config_names);
    let settings = Settings::new(config_names)?;
    info!("settings: {}", serde_json::to_string_pretty(&settings)?);

    let products = PartialProducts::new(settings.input_path.as_str())?;
    info!(
        "loaded {} partial products from {}",
        products.len(),
        settings.input_path
    );

    let engine = CobEngine::new(
        settings.engine_settings.bank_count,
        settings.engine_settings.bank_depth,
    );
    let source = FrameReader::new(io::Cursor::new(products.to_frames()));
    let sink = RecordWriter::new(io::BufWriter::new(std::fs::File::create(
        &settings.output_path,
    )?));
    let mut system = System::new(engine, source, sink);

    let started = Instant::now();
    let mut stat = system.run()?;
    stat.simulation_time = format_elapsed(started.elapsed().as_secs());

    let mut results = CobResult::new();
    results.settings = Some(settings);
    results.stats = Some(stat);
    let report = write_results(&results)?;
    info!("run report written to {}", report);
    Ok(())
}

/// h:m:s, long streams are easier to read this way than raw seconds
fn format_elapsed(total_secs: u64) -> String {
    format!(
        "{}:{}:{}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60
    )
}

/// dump the run report as json under output/, named by wall clock time
fn write_results(results: &CobResult) -> Result<String, Box<dyn Error>> {
    std::fs::create_dir_all("output")?;
    let stamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S%.6f");
    let path = format!("output/{}.json", stamp);
    std::fs::write(&path, serde_json::to_string_pretty(results)?)?;
    Ok(path)
}
