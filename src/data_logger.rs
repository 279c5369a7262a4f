use crate::config::TrackerConfig;
use crate::types::{CompactReading, DisplayState};
use crossbeam_channel::Receiver;
use log::{error, info};
use serde_json::json;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes a tracking session to disk: a manifest, a compact JSONL stream
/// of display readings, and summary stats at shutdown.
pub struct DataLogger {
    rx: Receiver<DisplayState>,
    session_dir: PathBuf,
    config: TrackerConfig,
    sample_rate_hz: u32,
}

impl DataLogger {
    pub fn new(
        rx: Receiver<DisplayState>,
        output_dir: &Path,
        config: TrackerConfig,
        sample_rate_hz: u32,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let session_dir = output_dir.join(format!("session_{}", timestamp));
        fs::create_dir_all(&session_dir).expect("create session dir");

        Self {
            rx,
            session_dir,
            config,
            sample_rate_hz,
        }
    }

    /// Run the logger. Blocks the calling thread.
    pub fn run(&self) {
        info!("Data logger → {:?}", self.session_dir);

        self.write_manifest();

        let readings_path = self.session_dir.join("readings.jsonl");
        let readings_file = File::create(&readings_path).expect("create readings file");
        let mut writer = BufWriter::new(readings_file);

        let mut reading_count: u64 = 0;
        let mut active_count: u64 = 0;
        let mut max_in_tune_secs: f64 = 0.0;

        for state in self.rx.iter() {
            if state.signal_active {
                active_count += 1;
            }
            max_in_tune_secs = max_in_tune_secs.max(state.in_tune_secs);

            let compact = CompactReading::from(&state);
            match serde_json::to_string(&compact) {
                Ok(line) => {
                    let _ = writeln!(writer, "{}", line);
                }
                Err(e) => error!("Failed to serialize reading: {}", e),
            }

            reading_count += 1;
            if reading_count % 1000 == 0 {
                let _ = writer.flush();
                info!("Logged {} readings ({} active)", reading_count, active_count);
            }
        }

        let _ = writer.flush();

        let stats_path = self.session_dir.join("stats.json");
        let stats = json!({
            "total_readings": reading_count,
            "active_readings": active_count,
            "max_in_tune_secs": max_in_tune_secs,
        });
        fs::write(&stats_path, serde_json::to_string_pretty(&stats).unwrap())
            .unwrap_or_else(|e| error!("Failed to write stats: {}", e));

        info!(
            "Session saved: {} readings ({} active) → {:?}",
            reading_count, active_count, self.session_dir
        );
    }

    fn write_manifest(&self) {
        let manifest = json!({
            "version": env!("CARGO_PKG_VERSION"),
            "system": "pitchlock",
            "sample_rate_hz": self.sample_rate_hz,
            "tracker_config": self.config,
            "reading_format": {
                "file": "readings.jsonl",
                "keys": {
                    "t": "timestamp_us",
                    "hz": "frequency_hz",
                    "n": "note_name",
                    "c": "cents_offset",
                    "a": "amplitude",
                    "on": "signal_active",
                    "it": "in_tune_secs",
                },
            },
        });

        let path = self.session_dir.join("manifest.json");
        fs::write(&path, serde_json::to_string_pretty(&manifest).unwrap())
            .expect("write manifest");
    }
}
