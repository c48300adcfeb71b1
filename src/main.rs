use std::path::PathBuf;
use std::process;

use chrono::Local;
use clap::Parser;
use fern::Dispatch;
use log::info;

use elevator_dispatch::core::building::{Building, BuildingConfig};
use elevator_dispatch::core::request::Floor;
use elevator_dispatch::input;
use elevator_dispatch::report::{self, Metrics};
use elevator_dispatch::simulation::Engine;

#[derive(Parser)]
#[command(name = "elevator-dispatch")]
#[command(about = "Simulates a building's elevators serving a table of call requests")]
struct Cli {
    /// Path of the call-request csv file
    #[arg(short, long)]
    input_csv: PathBuf,

    /// Number of floors in the building
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(Floor).range(1..))]
    floors: Floor,

    /// Number of elevators in the building
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..))]
    elevators: u16,

    /// Capacity of an elevator, in passengers
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    capacity: u16,

    /// Where to write the combined csv report
    #[arg(short, long, default_value = "output.csv")]
    output: PathBuf,
}

fn setup_logger() -> Result<(), Box<dyn std::error::Error>> {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::fs::File::create("elevator-dispatch.log")?)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let requests = input::load_call_requests(&cli.input_csv, cli.floors)?;
    info!(
        "loaded {} call requests for a building with {} floors, {} elevators",
        requests.len(),
        cli.floors,
        cli.elevators
    );

    let building = Building::new(BuildingConfig {
        number_of_floors: cli.floors,
        number_of_elevators: cli.elevators as usize,
        max_capacity_of_elevator: cli.capacity as usize,
    });
    let mut engine = Engine::new(building, requests);
    engine.run()?;

    let request_log = engine.request_log();
    let metrics = Metrics::from_request_log(&request_log);

    println!("\n------ Total Time taken: {} ------\n", engine.time());
    println!("{}", engine.elevator_log().render());
    println!("{}", request_log.render());
    if let Some(metrics) = &metrics {
        println!("{}", metrics.render());
    }

    report::write_combined_csv(&cli.output, engine.elevator_log(), &request_log, metrics.as_ref())?;
    info!("report written to {}", cli.output.display());

    Ok(())
}

fn main() {
    setup_logger().expect("failed to set up logging");

    let cli = Cli::parse();
    if let Err(error) = run(&cli) {
        eprintln!("error: {error}");
        process::exit(1);
    }
}
