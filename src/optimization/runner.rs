use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::optimization::config::{Command, CommandLineArgs, Config};
use crate::optimization::data::CityData;
use crate::optimization::error::RunError;
use crate::optimization::logging::init_logging;
use crate::optimization::network::TravelMode;
use crate::optimization::network_design::optimize_network;
use crate::optimization::routing::find_path;
use crate::optimization::schedule::optimize_schedules;
use crate::optimization::signals::{emergency_preemption, optimize_signals};

pub const OUTPUT_CONFIG_FILE: &str = "output_config.yml";

fn to_value<T: Serialize>(result: &T) -> Result<Value, RunError> {
    Ok(serde_json::to_value(result)?)
}

/// Runs `command` against `data`. Parameters not given on the command line are taken from
/// the config.
pub fn execute(config: &Config, data: &CityData, command: &Command) -> Result<Value, RunError> {
    match command {
        Command::Route {
            from,
            to,
            time_of_day,
        } => {
            let routing = config.routing();
            let time_of_day = time_of_day.unwrap_or(routing.time_of_day);
            to_value(&find_path(data, from, to, time_of_day, routing.mode)?)
        }
        Command::EmergencyRoute {
            from,
            to,
            time_of_day,
        } => {
            let time_of_day = time_of_day.unwrap_or(config.routing().time_of_day);
            to_value(&find_path(
                data,
                from,
                to,
                time_of_day,
                TravelMode::Emergency,
            )?)
        }
        Command::Network {
            algorithm,
            prioritize_population,
        } => {
            let network_design = config.network_design();
            to_value(&optimize_network(
                data,
                algorithm.unwrap_or(network_design.algorithm),
                prioritize_population.unwrap_or(network_design.prioritize_population),
                &network_design.critical_facilities,
            ))
        }
        Command::Signals {
            intersections,
            time_of_day,
        } => {
            let time_of_day = time_of_day.unwrap_or(config.routing().time_of_day);
            to_value(&optimize_signals(
                data,
                intersections,
                time_of_day,
                &config.signals(),
            ))
        }
        Command::Preempt { route, time_of_day } => {
            let time_of_day = time_of_day.unwrap_or(config.routing().time_of_day);
            to_value(&emergency_preemption(
                data,
                route,
                time_of_day,
                &config.signals(),
            )?)
        }
        Command::Schedules => to_value(&optimize_schedules(data, &config.schedules())),
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), RunError> {
    fs::write(path, content).map_err(|e| RunError::Output {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes the result as `<command>.json` together with the effective config into
/// `output_dir`.
pub fn write_output(
    config: &Config,
    command: &Command,
    result: &Value,
    output_dir: &Path,
) -> Result<PathBuf, RunError> {
    fs::create_dir_all(output_dir).map_err(|e| RunError::Output {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    let path = output_dir.join(format!("{}.json", command.name()));
    write_file(&path, serde_json::to_string_pretty(result)?.as_bytes())?;
    config.to_file(&output_dir.join(OUTPUT_CONFIG_FILE))?;
    info!("Wrote result to {path:?}");
    Ok(path)
}

/// Loads config and dataset named by `args`, runs the command and writes the result to the
/// output directory if one is configured.
pub fn run(args: &CommandLineArgs) -> Result<Value, RunError> {
    let config = Config::from_args(args)?;
    let _guards = init_logging(&config);
    info!("Started with args: {:?}", args);

    let dataset_path = config.dataset_path().ok_or(RunError::MissingDataset)?;
    let data = CityData::from_file(&dataset_path)?;

    let result = execute(&config, &data, &args.command)?;
    if let Some(output_dir) = config.output_dir() {
        write_output(&config, &args.command, &result, &output_dir)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::optimization::config::{Command, CommandLineArgs, Config};
    use crate::optimization::data::CityData;
    use crate::optimization::error::{OptimizationError, RunError};
    use crate::optimization::runner::{execute, run, OUTPUT_CONFIG_FILE};
    use crate::test_utils::{cairo_data, CAIRO_CONFIG};

    #[test]
    fn execute_route_command() {
        let data = cairo_data();
        let config = Config::default();
        let command = Command::Route {
            from: String::from("1"),
            to: String::from("F1"),
            time_of_day: None,
        };

        let result = execute(&config, &data, &command).unwrap();
        assert_eq!("1", result["path"][0]);
        assert_eq!(
            Some("F1"),
            result["path"].as_array().unwrap().last().unwrap().as_str()
        );
        assert_eq!("morning", result["time_of_day"]);
        assert_eq!("normal", result["mode_used"]);
    }

    #[test]
    fn execute_reports_engine_errors() {
        let data = cairo_data();
        let command = Command::Preempt {
            route: vec![String::from("1")],
            time_of_day: None,
        };
        assert!(matches!(
            execute(&Config::default(), &data, &command),
            Err(RunError::Optimization(OptimizationError::EmptyInput(_)))
        ));
    }

    #[test]
    fn run_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = CommandLineArgs {
            config_path: CAIRO_CONFIG.to_string(),
            output_dir: Some(dir.path().to_string_lossy().to_string()),
            command: Command::Schedules,
        };

        let result = run(&args).unwrap();
        assert_eq!(3, result["metro_schedules"].as_array().unwrap().len());
        assert!(dir.path().join("schedules.json").exists());
        assert!(dir.path().join(OUTPUT_CONFIG_FILE).exists());

        let written = Config::from_file(&dir.path().join(OUTPUT_CONFIG_FILE)).unwrap();
        assert!(written.dataset().is_some());
    }

    #[test]
    fn run_without_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        Config::default().to_file(&path).unwrap();
        let args = CommandLineArgs {
            config_path: path.to_string_lossy().to_string(),
            output_dir: None,
            command: Command::Schedules,
        };

        assert!(matches!(run(&args), Err(RunError::MissingDataset)));
    }

    #[test]
    fn load_dataset_from_bundled_config() {
        let config = Config::from_file(Path::new(CAIRO_CONFIG)).unwrap();
        let data = CityData::from_file(&config.dataset_path().unwrap()).unwrap();
        assert_eq!(27, data.locations().len());
    }
}
