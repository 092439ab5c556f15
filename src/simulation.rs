use crate::domain::grid2d::HeatGrid;
use crate::error::SimulationError;
use crate::json_io::JsonOutputManager;
use crate::stepper::{StepMethod, TimeStepper};
use tracing::{debug, info, info_span, warn};


#[derive(Debug)]
pub struct HeatSimulation {
    pub grid: HeatGrid,
    pub epsilon: f64,
    pub steps_completed: usize,
    stepper: TimeStepper,
}

impl HeatSimulation {
    pub fn new(grid: HeatGrid, epsilon: f64, method: StepMethod) -> Result<Self, SimulationError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(SimulationError::InvalidParameter(format!(
                "epsilon must be finite and non-negative, got {}",
                epsilon
            )));
        }
        let stepper = TimeStepper::new(method, grid.side(), epsilon)?;

        Ok(Self {
            grid,
            epsilon,
            steps_completed: 0,
            stepper,
        })
    }

    pub fn method(&self) -> StepMethod {
        self.stepper.method()
    }

    /// Advances the grid by one timestep.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        self.grid = self.stepper.step(&self.grid, self.epsilon)?;
        self.steps_completed += 1;
        Ok(())
    }

    /// Runs `num_steps` timesteps, handing snapshots to `output` when given.
    ///
    /// The initial state is offered as step 0 on a fresh simulation.
    pub fn run(
        &mut self,
        num_steps: usize,
        mut output: Option<&mut JsonOutputManager>,
    ) -> Result<(), SimulationError> {
        let run_span = info_span!(
            "simulation_run",
            num_steps = num_steps,
            method = ?self.method()
        )
        .entered();
        info!("Starting simulation with {} steps", num_steps);
        let start_time = std::time::Instant::now();

        if self.steps_completed == 0 {
            if let Some(out) = output.as_deref_mut() {
                if out.should_collect(0, num_steps == 0) {
                    out.collect(0, &self.grid).map_err(|e| SimulationError::Io(e.to_string()))?;
                }
            }
        }

        for i in 0..num_steps {
            let step_span = info_span!("time_step", step = self.steps_completed + 1).entered();

            if let Err(e) = self.step() {
                warn!(error = %e, "Simulation step failed");
                return Err(e);
            }
            debug!(
                "Step {}: total heat={:.6e}, peak={:.6e}",
                self.steps_completed,
                self.grid.total_heat(),
                self.grid.peak()
            );

            if let Some(out) = output.as_deref_mut() {
                if out.should_collect(self.steps_completed, i + 1 == num_steps) {
                    out.collect(self.steps_completed, &self.grid)
                        .map_err(|e| SimulationError::Io(e.to_string()))?;
                }
            }
            drop(step_span);
        }

        let total_time = start_time.elapsed();
        info!(
            "Simulation finished in {:.2}s, total heat {:.6e}",
            total_time.as_secs_f64(),
            self.grid.total_heat()
        );
        drop(run_span);
        Ok(())
    }
}
