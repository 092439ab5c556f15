use crate::domain::grid2d::HeatGrid;
use crate::stepper::StepMethod;
use serde::Serialize;
use serde_json;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

// --- Data Structures for Serialization ---

#[derive(Serialize, Debug)]
struct Metadata {
    n: usize,
    epsilon: f64,
    method: StepMethod,
    num_steps_completed: usize,
    output_frequency: Option<usize>,
    /// Flattening order of every `values` array.
    layout: &'static str,
}

#[derive(Serialize, Debug)]
pub struct SnapshotData {
    pub step: usize,
    pub total_heat: f64,
    pub peak: f64,
    pub values: Vec<f64>, // row-major, N*N
}

#[derive(Serialize, Debug)]
struct SimulationOutput<'a> {
    metadata: Metadata,
    data: &'a [SnapshotData],
}


// --- Output Manager ---
#[derive(Debug)]
pub struct JsonOutputManager {
    pub output_filepath: String,
    pub output_frequency: Option<usize>,
    pub collected_data: Vec<SnapshotData>,
    pub n: usize,
}

impl JsonOutputManager {
    /// Creates a new manager, making sure the output file's parent directory exists.
    pub fn new(
        output_filepath: String,
        output_frequency: Option<usize>,
        n: usize,
    ) -> Result<Self, io::Error> {
        let path = Path::new(&output_filepath);
        if let Some(parent_dir) = path.parent() {
            if !parent_dir.as_os_str().is_empty() {
                fs::create_dir_all(parent_dir)?;
                info!("Ensured output directory exists: {}", parent_dir.display());
            }
        }

        Ok(Self {
            output_filepath,
            output_frequency,
            collected_data: Vec::new(),
            n,
        })
    }

    /// `None` collects every step, `Some(0)` only the first and final steps,
    /// `Some(freq)` step 0, multiples of `freq` and the final step.
    pub fn should_collect(&self, step: usize, is_final_step: bool) -> bool {
        match self.output_frequency {
            Some(0) => step == 0 || is_final_step,
            Some(freq) => step == 0 || step % freq == 0 || is_final_step,
            None => true,
        }
    }

    pub fn collect(&mut self, step: usize, grid: &HeatGrid) -> Result<(), io::Error> {
        if grid.side() != self.n {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Grid size {}x{} does not match JsonOutputManager size {}x{}",
                    grid.side(),
                    grid.side(),
                    self.n,
                    self.n
                ),
            ));
        }

        let snapshot = SnapshotData {
            step,
            total_heat: grid.total_heat(),
            peak: grid.peak(),
            values: grid.to_row_major(),
        };
        info!("Collected snapshot for step {} (total heat {:.6e})", step, snapshot.total_heat);
        self.collected_data.push(snapshot);
        Ok(())
    }

    /// Writes metadata and all collected snapshots as pretty-printed JSON.
    pub fn write_final_output(
        &self,
        epsilon: f64,
        method: StepMethod,
        steps_completed: usize,
    ) -> Result<(), io::Error> {
        if self.collected_data.is_empty() {
            info!("No data collected, skipping JSON output to {}.", self.output_filepath);
            return Ok(());
        }
        info!("Writing collected data to JSON file: {}...", self.output_filepath);
        let output_start = Instant::now();

        let metadata = Metadata {
            n: self.n,
            epsilon,
            method,
            num_steps_completed: steps_completed,
            output_frequency: self.output_frequency,
            layout: "row-major",
        };
        let output_data = SimulationOutput { metadata, data: &self.collected_data };
        let json_string = serde_json::to_string_pretty(&output_data).map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to serialize data to JSON: {}", e),
            )
        })?;

        let file = File::create(&self.output_filepath)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json_string.as_bytes())?;
        writer.flush()?;
        info!("JSON output finished in {:.2}ms", output_start.elapsed().as_millis());
        Ok(())
    }
}
