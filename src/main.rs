use heat_diffusion::config::SimulationConfig;
use heat_diffusion::json_io::JsonOutputManager;
use heat_diffusion::simulation::HeatSimulation;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            SimulationConfig::from_json_file(&path)?
        }
        None => SimulationConfig::default(),
    };
    info!(?config, "Configuration");

    let grid = config.initial_grid()?;
    let mut output = JsonOutputManager::new(
        config.output_path.clone(),
        config.output_frequency,
        config.n,
    )?;

    let mut simulation = HeatSimulation::new(grid, config.epsilon, config.method)?;
    simulation.run(config.num_steps, Some(&mut output))?;

    output.write_final_output(config.epsilon, config.method, simulation.steps_completed)?;

    info!(
        "Final total heat {:.6e}, peak {:.6e}",
        simulation.grid.total_heat(),
        simulation.grid.peak()
    );
    Ok(())
}
