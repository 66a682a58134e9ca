use crate::prelude_crate::*;
use crate::simulation::Parameters;
use clap::Arg;
use core_affinity::{get_core_ids, set_for_current};
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub n: [usize; 3],
    pub resolution: Float,
    pub delta_p: Float,
    pub number_of_threads: NonZeroUsize,
    pub core_affinity: bool,
    pub max_iterations: usize,
    pub snapshot_interval: usize,
    pub check_interval: usize,
    pub omega: Float,
    pub tolerance: Float,
}

impl Config {
    pub fn get_number_of_threads(&self) -> usize {
        usize::from(self.number_of_threads)
    }

    pub fn get_parameters(&self) -> Parameters {
        Parameters {
            omega: self.omega,
            delta_p: self.delta_p,
            max_iterations: self.max_iterations,
            snapshot_interval: self.snapshot_interval,
            check_interval: self.check_interval,
            tracer_tolerance: self.tolerance,
            ..Default::default()
        }
    }
}

fn command() -> clap::Command {
    clap::command!()
        .arg_required_else_help(true)
        .arg(
            Arg::new("input")
                .value_name("GEOMETRY")
                .help("Geometry file: nx slices of ny x nz tags (0 fluid, 1 solid, 2 inactive)")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("output_dir")
                .value_name("OUTPUT_DIR")
                .help("Directory for the output files")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("nx")
                .value_name("NX")
                .help("Number of cells along the flow direction")
                .value_parser(clap::value_parser!(usize))
                .required(true),
        )
        .arg(
            Arg::new("ny")
                .value_name("NY")
                .value_parser(clap::value_parser!(usize))
                .required(true),
        )
        .arg(
            Arg::new("nz")
                .value_name("NZ")
                .value_parser(clap::value_parser!(usize))
                .required(true),
        )
        .arg(
            Arg::new("resolution")
                .value_name("RESOLUTION")
                .help("Cell size in metres")
                .value_parser(clap::value_parser!(Float))
                .required(true),
        )
        .arg(
            Arg::new("delta_p")
                .value_name("DELTA_P")
                .help("Pressure drop in lattice units")
                .value_parser(clap::value_parser!(Float))
                .allow_negative_numbers(true)
                .required(true),
        )
        .arg(
            Arg::new("number_of_threads")
                .short('n')
                .long("num-threads")
                .value_name("NTHREADS")
                .help("The number of threads used (min = 1)")
                .value_parser(clap::value_parser!(NonZeroUsize))
                .default_value("1"),
        )
        .arg(
            Arg::new("core_affinity")
                .long("affinity")
                .help("Set the core affinity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max_iterations")
                .long("max-iterations")
                .value_name("ITER")
                .help("The maximum number of iterations")
                .value_parser(clap::value_parser!(usize))
                .default_value("30000"),
        )
        .arg(
            Arg::new("snapshot_interval")
                .long("snapshot-interval")
                .value_name("ITER")
                .help("Iterations between velocity slice snapshots")
                .value_parser(clap::value_parser!(usize))
                .default_value("500"),
        )
        .arg(
            Arg::new("check_interval")
                .long("check-interval")
                .value_name("ITER")
                .help("Iterations between stability checks")
                .value_parser(clap::value_parser!(usize))
                .default_value("100"),
        )
        .arg(
            Arg::new("omega")
                .long("omega")
                .value_name("OMEGA")
                .help("BGK relaxation frequency, in (0, 2]")
                .value_parser(clap::value_parser!(Float))
                .default_value("1.0"),
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .value_name("TOL")
                .help("Relative deviation of the energy below which the run has converged")
                .value_parser(clap::value_parser!(Float))
                .default_value("1e-4"),
        )
}

pub fn get_args() -> clap::ArgMatches {
    command().get_matches()
}

pub fn get_args_from<I, T>(args: I) -> LbResult<clap::ArgMatches>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    command()
        .try_get_matches_from(args)
        .map_err(|e| LbError::InvalidArguments(e.to_string()))
}

pub fn parse_matches(matches: &clap::ArgMatches) -> LbResult<Config> {
    let required = |id: &str| LbError::InvalidArguments(format!("Missing argument {id}"));
    let get_usize = |id: &str| {
        matches
            .get_one::<usize>(id)
            .copied()
            .ok_or_else(|| required(id))
    };
    let get_float = |id: &str| {
        matches
            .get_one::<Float>(id)
            .copied()
            .ok_or_else(|| required(id))
    };
    let get_path = |id: &str| {
        matches
            .get_one::<PathBuf>(id)
            .cloned()
            .ok_or_else(|| required(id))
    };
    let n = [get_usize("nx")?, get_usize("ny")?, get_usize("nz")?];
    if n.contains(&0) {
        return Err(LbError::InvalidArguments(format!(
            "Grid dimensions must be positive, got {n:?}"
        )));
    }
    let resolution = get_float("resolution")?;
    if !(resolution > 0.0 && resolution.is_finite()) {
        return Err(LbError::InvalidArguments(format!(
            "Resolution must be positive, got {resolution}"
        )));
    }
    Ok(Config {
        input: get_path("input")?,
        output_dir: get_path("output_dir")?,
        n,
        resolution,
        delta_p: get_float("delta_p")?,
        number_of_threads: matches
            .get_one::<NonZeroUsize>("number_of_threads")
            .copied()
            .ok_or_else(|| required("number_of_threads"))?,
        core_affinity: matches.get_flag("core_affinity"),
        max_iterations: get_usize("max_iterations")?,
        snapshot_interval: get_usize("snapshot_interval")?,
        check_interval: get_usize("check_interval")?,
        omega: get_float("omega")?,
        tolerance: get_float("tolerance")?,
    })
}

pub fn init_global_pool(num_threads: usize, pin_all_cores: bool) -> LbResult<()> {
    let builder = rayon::ThreadPoolBuilder::new().num_threads(num_threads);
    let builder = match (pin_all_cores, get_core_ids()) {
        (true, Some(cores)) if !cores.is_empty() => builder.start_handler(move |idx| {
            let core = cores[idx % cores.len()];
            let _ = set_for_current(core);
        }),
        (true, _) => {
            eprintln!("Could not list the cores of the system, running without affinity.");
            builder
        }
        (false, _) => builder,
    };
    builder
        .build_global()
        .map_err(|e| LbError::InvalidArguments(format!("Could not build the thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARGS: [&str; 8] = [
        "lbperm",
        "geometry.dat",
        "out",
        "10",
        "20",
        "30",
        "1e-4",
        "5e-5",
    ];

    #[test]
    fn test_positional_arguments() {
        let matches = get_args_from(ARGS).unwrap();
        let config = parse_matches(&matches).unwrap();

        assert_eq!(config.input, PathBuf::from("geometry.dat"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.n, [10, 20, 30]);
        assert!((config.resolution - 1e-4).abs() < 1e-18);
        assert!((config.delta_p - 5e-5).abs() < 1e-18);
    }

    #[test]
    fn test_defaults() {
        let matches = get_args_from(ARGS).unwrap();
        let config = parse_matches(&matches).unwrap();

        assert_eq!(config.get_number_of_threads(), 1);
        assert!(!config.core_affinity);
        assert_eq!(config.max_iterations, 30000);
        assert_eq!(config.snapshot_interval, 500);
        assert_eq!(config.check_interval, 100);
        assert_eq!(config.omega, 1.0);
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.get_parameters(), Parameters {
            delta_p: 5e-5,
            ..Default::default()
        });
    }

    #[test]
    fn test_options() {
        let mut args = ARGS.to_vec();
        args.extend([
            "--num-threads",
            "4",
            "--affinity",
            "--omega",
            "1.2",
            "--max-iterations",
            "100",
        ]);

        let config = parse_matches(&get_args_from(args).unwrap()).unwrap();

        assert_eq!(config.get_number_of_threads(), 4);
        assert!(config.core_affinity);
        assert_eq!(config.omega, 1.2);
        assert_eq!(config.max_iterations, 100);
    }

    #[test]
    fn test_wrong_number_of_arguments() {
        let result = get_args_from(ARGS[..6].to_vec());

        assert!(matches!(result, Err(LbError::InvalidArguments(_))));
    }

    #[test]
    fn test_non_numeric_dimension() {
        let mut args = ARGS.to_vec();
        args[3] = "ten";

        assert!(matches!(get_args_from(args), Err(LbError::InvalidArguments(_))));
    }

    #[test]
    fn test_zero_dimension() {
        let mut args = ARGS.to_vec();
        args[4] = "0";

        let result = parse_matches(&get_args_from(args).unwrap());

        assert!(matches!(result, Err(LbError::InvalidArguments(_))));
    }
}
