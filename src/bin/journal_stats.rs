use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use orbit_engine::ephemeris::BodyId;
use orbit_engine::sim::JournalFile;

/// Summarize simulation journal files.
#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect Orbit Engine journal directories")]
struct Cli {
    /// Journal directory to scan
    #[arg(long, default_value = "simulation_logs")]
    dir: PathBuf,

    /// Analyze one specific journal file instead of the whole directory
    #[arg(long)]
    file: Option<PathBuf>,

    /// Print the recorded trajectory extent for one body
    #[arg(long)]
    body: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(file) = &cli.file {
        let journal = load_journal(file)?;
        print_file_summary(file, &journal);
        return Ok(());
    }

    let files = journal_files(&cli.dir)?;
    if files.is_empty() {
        bail!("no journal files found in {}", cli.dir.display());
    }

    if let Some(body) = &cli.body {
        return print_body_trajectory(&files, body);
    }

    let mut total_timesteps = 0usize;
    let mut total_duration = 0.0;
    for path in &files {
        let journal = load_journal(path)?;
        print_file_summary(path, &journal);
        total_timesteps += journal.metadata.total_timesteps;
        total_duration += journal.metadata.end_time - journal.metadata.start_time;
    }

    println!("== summary ==");
    println!("files:               {}", files.len());
    println!("timesteps logged:    {total_timesteps}");
    println!("simulated duration:  {total_duration:.2} s");
    Ok(())
}

fn journal_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("reading journal directory {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    files.sort();
    Ok(files)
}

fn load_journal(path: &Path) -> anyhow::Result<JournalFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading journal file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing journal file {}", path.display()))
}

fn print_file_summary(path: &Path, journal: &JournalFile) {
    let meta = &journal.metadata;
    println!("== {} ==", path.display());
    println!("file number:     {}", meta.file_number);
    println!("timesteps:       {}", meta.total_timesteps);
    println!("sim time span:   {:.2} s .. {:.2} s", meta.start_time, meta.end_time);
    println!("epoch:           {}", meta.epoch);

    if let (Some(first), Some(last)) = (journal.data.first(), journal.data.last()) {
        println!(
            "ticks:           {} .. {} (time scale {} .. {})",
            first.tick, last.tick, first.time_scale, last.time_scale
        );
        let mut displacement: BTreeMap<BodyId, f64> = BTreeMap::new();
        for (id, state) in &first.bodies {
            if let Some(end_state) = last.bodies.get(id) {
                let dx = end_state.r_au[0] - state.r_au[0];
                let dy = end_state.r_au[1] - state.r_au[1];
                let dz = end_state.r_au[2] - state.r_au[2];
                displacement.insert(*id, (dx * dx + dy * dy + dz * dz).sqrt());
            }
        }
        for (id, distance) in displacement {
            println!("  {id:<8} moved {distance:.4} au");
        }
    }
}

fn print_body_trajectory(files: &[PathBuf], body: &str) -> anyhow::Result<()> {
    let id = orbit_engine::ephemeris::parse_body(body)?;
    let mut positions = Vec::new();
    for path in files {
        let journal = load_journal(path)?;
        for record in &journal.data {
            if let Some(state) = record.bodies.get(&id) {
                positions.push(state.r_au);
            }
        }
    }
    if positions.is_empty() {
        bail!("no records for body `{body}`");
    }
    println!("{} positions recorded for {id}", positions.len());
    println!("first: {:?}", positions.first().unwrap_or(&[0.0; 3]));
    println!("last:  {:?}", positions.last().unwrap_or(&[0.0; 3]));
    Ok(())
}
