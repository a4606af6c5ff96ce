use std::any::Any;
use std::cell::RefCell;
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use ahash::HashMap;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::optimization::data::traffic::TimeOfDay;
use crate::optimization::error::ConfigError;
use crate::optimization::io::resolve_path;
use crate::optimization::network::TravelMode;
use crate::optimization::network_design::NetworkAlgorithm;
use crate::optimization::schedule::ScheduleSettings;
use crate::optimization::signals::SignalSettings;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    #[arg(long, short)]
    pub config_path: String,
    /// Overrides the output directory of the config. Relative to the working directory.
    #[arg(long, short)]
    pub output_dir: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fastest route between two locations.
    Route {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, value_enum)]
        time_of_day: Option<TimeOfDay>,
    },
    /// Fastest route for emergency vehicles, falling back to normal traffic.
    EmergencyRoute {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, value_enum)]
        time_of_day: Option<TimeOfDay>,
    },
    /// Minimum cost road network over existing and potential roads.
    Network {
        #[arg(long, value_enum)]
        algorithm: Option<NetworkAlgorithm>,
        #[arg(long)]
        prioritize_population: Option<bool>,
    },
    /// Green time allocation for intersections. Without ids the busiest ones are used.
    Signals {
        #[arg(long, value_delimiter = ',')]
        intersections: Vec<String>,
        #[arg(long, value_enum)]
        time_of_day: Option<TimeOfDay>,
    },
    /// Signal preemption along an emergency route.
    Preempt {
        #[arg(long, value_delimiter = ',', required = true)]
        route: Vec<String>,
        #[arg(long, value_enum)]
        time_of_day: Option<TimeOfDay>,
    },
    /// Metro, bus and maintenance schedules.
    Schedules,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Route { .. } => "route",
            Command::EmergencyRoute { .. } => "emergency-route",
            Command::Network { .. } => "network",
            Command::Signals { .. } => "signals",
            Command::Preempt { .. } => "preempt",
            Command::Schedules => "schedules",
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    modules: RefCell<HashMap<String, Box<dyn ConfigModule>>>,
    #[serde(skip)]
    context: Option<PathBuf>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?);
        let mut config: Config =
            serde_yaml::from_reader(reader).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.context = Some(path.to_path_buf());
        info!("Config: read configuration from {path:?}");
        Ok(config)
    }

    /// Reads the config file named on the command line and applies the overrides passed
    /// along with it. Paths from the command line are taken relative to the working
    /// directory, not to the config file.
    pub fn from_args(args: &CommandLineArgs) -> Result<Self, ConfigError> {
        let mut config = Config::from_file(Path::new(&args.config_path))?;
        if let Some(output_dir) = &args.output_dir {
            let output_dir = from_working_dir(output_dir)?;
            let output = Output {
                output_dir: Some(output_dir.to_string_lossy().to_string()),
                logging: config.output().logging,
            };
            config.set_output(output);
        }
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let file = File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::to_writer(BufWriter::new(file), self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The config file this configuration was read from. Relative paths are resolved
    /// against its directory.
    pub fn context(&self) -> Option<&Path> {
        self.context.as_deref()
    }

    fn resolve(&self, file: &str) -> PathBuf {
        match self.context() {
            Some(context) => resolve_path(context, file),
            None => PathBuf::from(file),
        }
    }

    pub fn dataset(&self) -> Option<Dataset> {
        self.module::<Dataset>("dataset")
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.modules
            .get_mut()
            .insert("dataset".to_string(), Box::new(dataset));
    }

    pub fn dataset_path(&self) -> Option<PathBuf> {
        self.dataset().map(|d| self.resolve(&d.path))
    }

    pub fn output(&self) -> Output {
        if let Some(output) = self.module::<Output>("output") {
            output
        } else {
            let default = Output::default();
            self.modules
                .borrow_mut()
                .insert("output".to_string(), Box::new(default.clone()));
            default
        }
    }

    pub fn set_output(&mut self, output: Output) {
        self.modules
            .get_mut()
            .insert("output".to_string(), Box::new(output));
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output().output_dir.map(|dir| self.resolve(&dir))
    }

    pub fn routing(&self) -> Routing {
        if let Some(routing) = self.module::<Routing>("routing") {
            routing
        } else {
            let default = Routing::default();
            self.modules
                .borrow_mut()
                .insert("routing".to_string(), Box::new(default.clone()));
            default
        }
    }

    pub fn network_design(&self) -> NetworkDesign {
        if let Some(network_design) = self.module::<NetworkDesign>("network_design") {
            network_design
        } else {
            let default = NetworkDesign::default();
            self.modules
                .borrow_mut()
                .insert("network_design".to_string(), Box::new(default.clone()));
            default
        }
    }

    pub fn set_network_design(&mut self, network_design: NetworkDesign) {
        self.modules
            .get_mut()
            .insert("network_design".to_string(), Box::new(network_design));
    }

    pub fn signals(&self) -> SignalSettings {
        if let Some(signals) = self.module::<SignalSettings>("signals") {
            signals
        } else {
            let default = SignalSettings::default();
            self.modules
                .borrow_mut()
                .insert("signals".to_string(), Box::new(default.clone()));
            default
        }
    }

    pub fn set_signals(&mut self, signals: SignalSettings) {
        self.modules
            .get_mut()
            .insert("signals".to_string(), Box::new(signals));
    }

    pub fn schedules(&self) -> ScheduleSettings {
        if let Some(schedules) = self.module::<ScheduleSettings>("schedules") {
            schedules
        } else {
            let default = ScheduleSettings::default();
            self.modules
                .borrow_mut()
                .insert("schedules".to_string(), Box::new(default.clone()));
            default
        }
    }

    pub fn set_schedules(&mut self, schedules: ScheduleSettings) {
        self.modules
            .get_mut()
            .insert("schedules".to_string(), Box::new(schedules));
    }

    fn module<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.modules
            .borrow()
            .get(key)
            .and_then(|boxed| boxed.as_ref().as_any().downcast_ref::<T>().cloned())
    }
}

fn from_working_dir(file: &str) -> Result<PathBuf, ConfigError> {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        return Ok(path);
    }
    let working_dir = env::current_dir().map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    Ok(working_dir.join(path))
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dataset {
    pub path: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Output {
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Routing {
    #[serde(default)]
    pub time_of_day: TimeOfDay,
    #[serde(default)]
    pub mode: TravelMode,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct NetworkDesign {
    #[serde(default)]
    pub algorithm: NetworkAlgorithm,
    #[serde(default)]
    pub prioritize_population: bool,
    #[serde(default)]
    pub critical_facilities: Vec<String>,
}

/// Have this extra layer of log level enum, as tracing subscriber has no
/// off/none option by default.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum Logging {
    #[default]
    None,
    Info,
}

#[typetag::serde(tag = "type")]
pub trait ConfigModule {
    fn as_any(&self) -> &dyn Any;
}

#[typetag::serde]
impl ConfigModule for Dataset {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Output {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Routing {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for NetworkDesign {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde(name = "Signals")]
impl ConfigModule for SignalSettings {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde(name = "Schedules")]
impl ConfigModule for ScheduleSettings {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
