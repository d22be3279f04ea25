//! Batched per-tick state journaling.
//!
//! Records flow from the tick loop through a bounded drop-oldest queue to a
//! background writer; every `batch_size` records become one numbered JSON
//! file under the journal directory. I/O problems are logged and counted,
//! never surfaced to the tick loop.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use orbit_config::JournalSettings;
use orbit_core::time;
use orbit_core::vector::Vector3;
use orbit_ephemeris::BodyId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// One tick's worth of journal data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub tick: u64,
    pub sim_time: f64,
    pub wall_time: String,
    pub time_scale: f64,
    pub bodies: BTreeMap<BodyId, JournalBodyState>,
}

/// Body state in both SI and display units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalBodyState {
    pub r_m: Vector3,
    pub r_au: Vector3,
    pub v_ms: Vector3,
}

/// Header written at the top of each journal file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalMetadata {
    pub total_timesteps: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub epoch: String,
    pub file_number: u64,
}

/// On-disk journal file layout.
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalFile {
    pub metadata: JournalMetadata,
    pub data: Vec<JournalRecord>,
}

/// Producer side handed to the engine.
#[derive(Debug, Clone)]
pub struct JournalHandle {
    tx: broadcast::Sender<JournalRecord>,
}

impl JournalHandle {
    /// Enqueue a record; the ring drops the oldest entry on overflow so the
    /// tick loop never waits on the writer.
    pub fn record(&self, record: JournalRecord) {
        let _ = self.tx.send(record);
    }
}

/// Create the journal directory, spawn the writer task, and return the
/// producer handle. The task drains until every `JournalHandle` clone is
/// dropped, then flushes the final partial batch.
pub fn spawn(settings: &JournalSettings) -> std::io::Result<(JournalHandle, JoinHandle<()>)> {
    fs::create_dir_all(&settings.dir)?;
    let (tx, rx) = broadcast::channel(settings.queue_depth);
    let writer = JournalWriter {
        dir: settings.dir.clone(),
        batch_size: settings.batch_size,
        batch: Vec::new(),
        next_file_number: 1,
        dropped_records: 0,
        write_errors: 0,
    };
    let task = tokio::spawn(writer.run(rx));
    Ok((JournalHandle { tx }, task))
}

struct JournalWriter {
    dir: PathBuf,
    batch_size: usize,
    batch: Vec<JournalRecord>,
    next_file_number: u64,
    dropped_records: u64,
    write_errors: u64,
}

impl JournalWriter {
    async fn run(mut self, mut rx: broadcast::Receiver<JournalRecord>) {
        loop {
            match rx.recv().await {
                Ok(record) => {
                    self.batch.push(record);
                    if self.batch.len() >= self.batch_size {
                        self.flush();
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    self.dropped_records += skipped;
                    tracing::warn!(skipped, total = self.dropped_records, "journal queue overflow");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.flush();
        tracing::info!(
            files = self.next_file_number - 1,
            dropped = self.dropped_records,
            write_errors = self.write_errors,
            "journal writer stopped"
        );
    }

    fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let records = std::mem::take(&mut self.batch);
        let file_number = self.next_file_number;
        let path = self
            .dir
            .join(format!("simulation_log_{file_number:05}.json"));
        let journal = JournalFile {
            metadata: JournalMetadata {
                total_timesteps: records.len(),
                start_time: records.first().map(|r| r.sim_time).unwrap_or_default(),
                end_time: records.last().map(|r| r.sim_time).unwrap_or_default(),
                epoch: time::epoch_iso(),
                file_number,
            },
            data: records,
        };
        match write_file(&path, &journal) {
            Ok(()) => {
                self.next_file_number += 1;
                tracing::info!(
                    path = %path.display(),
                    records = journal.metadata.total_timesteps,
                    "journal batch flushed"
                );
            }
            Err(err) => {
                self.write_errors += 1;
                tracing::error!(path = %path.display(), error = %err, "journal flush failed");
            }
        }
    }
}

fn write_file(path: &std::path::Path, journal: &JournalFile) -> std::io::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, journal).map_err(std::io::Error::from)
}
