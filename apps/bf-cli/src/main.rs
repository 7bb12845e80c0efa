use bf_config::ConfigError;
use bf_core::{format_matrix, format_vector};
use bf_fit::{Differencing, ElementFit, FitError, LmConfig};
use bf_lattice::{Params, Payload, Value};
use bf_sim::{Machine, SimError, StateOptions};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error("{0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "bf-cli")]
#[command(about = "Beamflow CLI - linear lattice propagation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of the machine
    Describe {
        /// Lattice file (.lat GLPS, .yaml/.yml, or .json)
        config: PathBuf,
        /// Variable definitions visible to GLPS files (name=value)
        #[arg(short = 'D', long = "define", value_parser = parse_define)]
        defines: Vec<(String, Value)>,
    },
    /// Render the configuration as GLPS
    Print {
        /// Lattice file (.lat GLPS, .yaml/.yml, or .json)
        config: PathBuf,
        /// Variable definitions visible to GLPS files (name=value)
        #[arg(short = 'D', long = "define", value_parser = parse_define)]
        defines: Vec<(String, Value)>,
    },
    /// Propagate a state through the whole machine
    Propagate {
        /// Lattice file (.lat GLPS, .yaml/.yml, or .json)
        config: PathBuf,
        /// Initial payload values (row-major for matrices)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        state: Vec<f64>,
        /// Element indices to record the state after
        #[arg(long, value_delimiter = ',')]
        observe: Vec<usize>,
        /// Variable definitions visible to GLPS files (name=value)
        #[arg(short = 'D', long = "define", value_parser = parse_define)]
        defines: Vec<(String, Value)>,
    },
    /// Fit numeric parameters of one element to reach a target state
    Fit {
        /// Lattice file (.lat GLPS, .yaml/.yml, or .json)
        config: PathBuf,
        /// Index of the element to adjust
        #[arg(long)]
        element: usize,
        /// Parameter names to fit (repeatable)
        #[arg(long = "param", required = true)]
        params: Vec<String>,
        /// Starting values, one per parameter (default 0)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        initial: Vec<f64>,
        /// Initial payload values
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        state: Vec<f64>,
        /// Target payload values
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
        target: Vec<f64>,
        /// Use central differences for the Jacobian
        #[arg(long)]
        central: bool,
        /// Print the fitted machine as GLPS
        #[arg(long)]
        print_config: bool,
        /// Variable definitions visible to GLPS files (name=value)
        #[arg(short = 'D', long = "define", value_parser = parse_define)]
        defines: Vec<(String, Value)>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Describe { config, defines } => cmd_describe(&config, &to_params(defines)),
        Commands::Print { config, defines } => cmd_print(&config, &to_params(defines)),
        Commands::Propagate {
            config,
            state,
            observe,
            defines,
        } => cmd_propagate(&config, &to_params(defines), &state, &observe),
        Commands::Fit {
            config,
            element,
            params,
            initial,
            state,
            target,
            central,
            print_config,
            defines,
        } => cmd_fit(
            &config,
            &to_params(defines),
            FitArgs {
                element,
                params,
                initial,
                state,
                target,
                central,
                print_config,
            },
        ),
    }
}

/// Parse `name=value`; value is a number, `[a, b, ...]`, or text.
fn parse_define(arg: &str) -> Result<(String, Value), String> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{}'", arg));
    }
    let raw = raw.trim();

    let value = if let Ok(v) = raw.parse::<f64>() {
        Value::Number(v)
    } else if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f64>().map_err(|_| format!("bad array entry '{}'", s)))
            .collect::<Result<Vec<_>, _>>()?;
        Value::Array(items)
    } else {
        Value::Text(raw.trim_matches('"').to_string())
    };
    Ok((name.to_string(), value))
}

fn to_params(defines: Vec<(String, Value)>) -> Params {
    defines.into_iter().collect()
}

fn load_machine(path: &Path, extra: &Params) -> CliResult<Machine> {
    let machine = Machine::from_path(path, extra)?;
    debug!(path = %path.display(), elements = machine.len(), "loaded machine");
    Ok(machine)
}

fn render(payload: &Payload) -> String {
    match payload {
        Payload::Vector(v) => format_vector(v),
        Payload::Matrix(m) => format_matrix(m),
    }
}

fn cmd_describe(path: &Path, extra: &Params) -> CliResult<()> {
    let machine = load_machine(path, extra)?;
    print!("{}", machine);
    Ok(())
}

fn cmd_print(path: &Path, extra: &Params) -> CliResult<()> {
    let config = bf_config::load_path(path, extra)?;
    print!("{}", bf_config::to_glps(&config)?);
    Ok(())
}

fn cmd_propagate(path: &Path, extra: &Params, state: &[f64], observe: &[usize]) -> CliResult<()> {
    let machine = load_machine(path, extra)?;
    let s = machine.alloc_state_with(StateOptions {
        initial: (!state.is_empty()).then(|| state.to_vec()),
        next_elem: 0,
    })?;

    let observe = (!observe.is_empty()).then_some(observe);
    let observed = machine.propagate(&s, observe)?;

    for (index, snapshot) in observed.unwrap_or_default() {
        let name = machine.element(index)?.name();
        println!("Element {} ({}): {}", index, name, render(snapshot.payload()));
    }
    println!("Final: {}", render(&s.payload()));
    Ok(())
}

struct FitArgs {
    element: usize,
    params: Vec<String>,
    initial: Vec<f64>,
    state: Vec<f64>,
    target: Vec<f64>,
    central: bool,
    print_config: bool,
}

fn cmd_fit(path: &Path, extra: &Params, args: FitArgs) -> CliResult<()> {
    let mut machine = load_machine(path, extra)?;

    let p0 = if args.initial.is_empty() {
        vec![0.0; args.params.len()]
    } else if args.initial.len() == args.params.len() {
        args.initial
    } else {
        return Err(CliError::Usage(format!(
            "--initial has {} values for {} parameters",
            args.initial.len(),
            args.params.len()
        )));
    };

    let config = LmConfig {
        differencing: if args.central {
            Differencing::Central
        } else {
            Differencing::Forward
        },
        ..LmConfig::default()
    };

    let names = args.params.clone();
    let result = ElementFit::new(
        &mut machine,
        args.element,
        args.params,
        args.state,
        args.target,
    )?
    .solve(&p0, &config)?;

    println!("Fitted element {}:", args.element);
    for (name, value) in names.iter().zip(result.x.iter()) {
        println!("  {} = {:e}", name, value);
    }
    println!("  cost = {:.3e} after {} iterations", result.cost, result.iterations);

    if args.print_config {
        print!("{}", bf_config::to_glps(&machine.to_config())?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_values() {
        assert_eq!(
            parse_define("L=2e-3").unwrap(),
            ("L".to_string(), Value::Number(2e-3))
        );
        assert_eq!(
            parse_define("initial=[1, 0.5]").unwrap(),
            ("initial".to_string(), Value::Array(vec![1.0, 0.5]))
        );
        assert_eq!(
            parse_define("sim_type=\"Vector\"").unwrap(),
            ("sim_type".to_string(), Value::Text("Vector".to_string()))
        );
        assert!(parse_define("novalue").is_err());
        assert!(parse_define("=1").is_err());
        assert!(parse_define("a=[1, x]").is_err());
    }

    #[test]
    fn cli_parses_propagate() {
        let cli = Cli::try_parse_from([
            "bf-cli",
            "propagate",
            "m.lat",
            "--state",
            "1,-1e-3,0,0,0,0",
            "--observe",
            "0,2",
            "-D",
            "L=1e-3",
        ])
        .unwrap();
        match cli.command {
            Commands::Propagate {
                state,
                observe,
                defines,
                ..
            } => {
                assert_eq!(state, vec![1.0, -1e-3, 0.0, 0.0, 0.0, 0.0]);
                assert_eq!(observe, vec![0, 2]);
                assert_eq!(defines.len(), 1);
            }
            _ => panic!("expected propagate"),
        }
    }

    #[test]
    fn cli_parses_fit() {
        let cli = Cli::try_parse_from([
            "bf-cli",
            "fit",
            "bend.lat",
            "--element",
            "1",
            "--param",
            "K",
            "--state",
            "1,1e-3",
            "--target",
            "1.1,-1e-3,1,1e-3,1,1e-3",
            "--central",
        ])
        .unwrap();
        match cli.command {
            Commands::Fit {
                element,
                params,
                target,
                central,
                print_config,
                ..
            } => {
                assert_eq!(element, 1);
                assert_eq!(params, vec!["K".to_string()]);
                assert_eq!(target[1], -1e-3);
                assert!(central);
                assert!(!print_config);
            }
            _ => panic!("expected fit"),
        }
    }
}
