use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::LevelFilter;

use crate::{error::Result, LavaError, LavaLampSimulation, SimulationParams};

use super::vtk_exporter::VtkExporter;

const CARGO_PKG_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const CARGO_PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub fn start() {
    let matches = App::new("Lava Lamp LBM")
        .version(CARGO_PKG_VERSION)
        .author(CARGO_PKG_AUTHORS)
        .about(CARGO_PKG_DESCRIPTION)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Run the lava lamp headless and report statistics")
                .arg(
                    Arg::with_name("SIMULATION_CONFIG")
                        .help("YAML file with the simulation parameters (defaults if omitted)")
                        .required(false)
                        .index(1),
                )
                .arg(
                    Arg::with_name("OVERWRITE_CONFIG_FILE")
                        .long("overwrite-config-file")
                        .short("c")
                        .required(false)
                        .takes_value(true)
                        .requires("SIMULATION_CONFIG")
                        .help("Overwrite individual parameters of the config"),
                )
                .arg(
                    Arg::with_name("WIDTH")
                        .long("width")
                        .takes_value(true)
                        .default_value("50")
                        .help("Grid width in cells"),
                )
                .arg(
                    Arg::with_name("HEIGHT")
                        .long("height")
                        .takes_value(true)
                        .default_value("75")
                        .help("Grid height in cells"),
                )
                .arg(
                    Arg::with_name("TICKS")
                        .long("ticks")
                        .short("t")
                        .takes_value(true)
                        .default_value("2000")
                        .help("Number of ticks to simulate"),
                )
                .arg(
                    Arg::with_name("REPORT_EVERY")
                        .long("report-every")
                        .takes_value(true)
                        .default_value("100")
                        .help("Log statistics (and write a snapshot) every N ticks"),
                )
                .arg(
                    Arg::with_name("VTK_DIR")
                        .long("vtk-dir")
                        .takes_value(true)
                        .required(false)
                        .help("Write VTK snapshots of the fields into this folder"),
                )
                .arg(
                    Arg::with_name("STATISTICS_ENABLED")
                        .help("Track performance of individual phases")
                        .short("p")
                        .long("statistics-enabled")
                        .takes_value(false),
                ),
        )
        .subcommand(
            SubCommand::with_name("default-config")
                .about("Write the reference parameter set to a YAML file")
                .arg(
                    Arg::with_name("OUTPUT_YAML")
                        .help("YAML file the parameters are written to")
                        .default_value("./lava-lamp.yaml")
                        .takes_value(true),
                ),
        )
        .get_matches();

    init_logging(matches.occurrences_of("v"));

    let result = if let Some(run_matches) = matches.subcommand_matches("run") {
        run(run_matches)
    } else if let Some(subcmd_matches) = matches.subcommand_matches("default-config") {
        let yaml_path = subcmd_matches.value_of("OUTPUT_YAML").unwrap_or("./lava-lamp.yaml");
        write_default_config(Path::new(yaml_path))
    } else {
        unreachable!()
    };

    if let Err(err) = result {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();
}

fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    let value = matches.value_of(name).unwrap_or_default();
    value
        .parse::<T>()
        .map_err(|_| LavaError::InvalidParameter(format!("cannot parse {} from `{}`", name, value)))
}

fn write_default_config(path: &Path) -> Result<()> {
    let yaml = SimulationParams::default().to_yaml_string()?;
    log::info!("Writing default parameters to `{}`...", path.display());
    std::fs::write(path, yaml)?;
    Ok(())
}

fn run(run_matches: &ArgMatches) -> Result<()> {
    let simulation_params = match run_matches.value_of("SIMULATION_CONFIG") {
        Some(parameter_file) => SimulationParams::load(
            Path::new(parameter_file),
            run_matches.value_of("OVERWRITE_CONFIG_FILE").map(Path::new),
        )?,
        None => SimulationParams::default(),
    };
    log::debug!("{:?}", simulation_params);

    let width: usize = parse_arg(run_matches, "WIDTH")?;
    let height: usize = parse_arg(run_matches, "HEIGHT")?;
    let ticks: usize = parse_arg(run_matches, "TICKS")?;
    let report_every: usize = parse_arg::<usize>(run_matches, "REPORT_EVERY")?.max(1);
    let counters_enabled = run_matches.is_present("STATISTICS_ENABLED");

    let mut vtk_exporter = match run_matches.value_of("VTK_DIR") {
        Some(dir) => Some(VtkExporter::new(PathBuf::from(dir), "lava-lamp")?),
        None => None,
    };

    let mut simulation = LavaLampSimulation::new(width, height, simulation_params)?.with_counters(counters_enabled);
    let initial = simulation.record_statistics();
    log::info!("initial: {:?}", initial);

    if let Some(vtk_exporter) = &mut vtk_exporter {
        vtk_exporter.add_snapshot(&simulation)?;
    }

    let mut total_duration = Duration::from_nanos(0);
    let mut unstable_reported = false;

    while simulation.tick_count() < ticks {
        let n = report_every.min(ticks - simulation.tick_count());

        let a = Instant::now();
        simulation.step(n);
        total_duration += Instant::now() - a;

        let stats = simulation.record_statistics();
        log::info!(
            "{:05}: wax mass {:.4} ({:+.3}%) max temp {:.3} plume height {} mixed cells {} ({:.3}msec per tick AVG)",
            simulation.tick_count(),
            stats.mass_a,
            (stats.mass_a / initial.mass_a - 1.) * 100.,
            stats.max_temp,
            stats.plume_height,
            stats.mixed_cells,
            total_duration.as_secs_f64() * 1000. / simulation.tick_count() as f64,
        );

        if !stats.is_finite() && !unstable_reported {
            log::warn!(
                "simulation became unstable at tick {}: {} non-finite cells",
                simulation.tick_count(),
                stats.non_finite_cells
            );
            unstable_reported = true;
        }
        if stats.negative_populations > 0 {
            log::debug!("{} negative populations", stats.negative_populations);
        }

        if let Some(vtk_exporter) = &mut vtk_exporter {
            vtk_exporter.add_snapshot(&simulation)?;
        }
    }

    print!("{}", serde_yaml::to_string(&simulation.statistics())?);

    if counters_enabled {
        print!("{}", simulation.counter_report());
    }

    Ok(())
}
