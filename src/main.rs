use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use tracing::error;

use single_node::constants::{Algorithm, RunCode};
use single_node::loader::read_instance_dir;
use single_node::{build, logging, MicroLpSolver, Model, Solution, SolveStatus, Solver, SolverOptions};

pub fn build_cli_command() -> Command {
    Command::new("single-node")
        .version("0.1.0")
        .about("Picks a VM type and GPU count per job by solving the single node MILP")

        .arg(Arg::new("instance_dir")
            .required(true)
            .help("Directory holding vms.csv, jobs.csv and times.csv"))

        .arg(Arg::new("time_limit")
            .short('t')
            .long("time-limit")
            .value_parser(value_parser!(f64))
            .help("Solver time limit in seconds"))

        .arg(Arg::new("gap")
            .short('g')
            .long("gap")
            .value_parser(value_parser!(f64))
            .help("Relative optimality gap at which the solver may stop"))

        .arg(Arg::new("algorithm")
            .short('a')
            .long("algorithm")
            .help("Algorithm hint for the solver")
            .value_parser(["auto", "simplex", "interior-point"])
            .default_value("auto"))
}

/// Maps the solver flags onto `SolverOptions`.
pub fn solver_options(matches: &ArgMatches) -> anyhow::Result<SolverOptions> {
    let time_limit = matches
        .get_one::<f64>("time_limit")
        .map(|&secs| Duration::try_from_secs_f64(secs))
        .transpose()
        .context("invalid --time-limit")?;

    let algorithm = match matches.get_one::<String>("algorithm").map(String::as_str) {
        Some("simplex") => Algorithm::Simplex,
        Some("interior-point") => Algorithm::InteriorPoint,
        _ => Algorithm::Auto,
    };

    Ok(SolverOptions {
        time_limit,
        mip_gap: matches.get_one::<f64>("gap").copied(),
        algorithm,
    })
}

fn run(matches: &ArgMatches) -> anyhow::Result<(Model, Solution)> {
    let dir = matches
        .get_one::<String>("instance_dir")
        .context("missing instance directory")?;
    let options = solver_options(matches)?;

    let data = read_instance_dir(dir).with_context(|| format!("cannot load instance from {dir}"))?;
    let model = build(&data).context("invalid instance")?;
    let solution = MicroLpSolver.solve(&model, &options);

    Ok((model, solution))
}

/// Human readable summary of a solution.
pub fn report(model: &Model, solution: &Solution) -> String {
    let instance = model.instance();
    let mut lines = vec![format!("status: {}", solution.status())];

    let Some(objective) = solution.objective() else {
        return lines.join("\n");
    };
    lines.push(format!("objective: {objective:.3}"));

    if let Some(v) = solution.chosen_vm(model) {
        lines.push(format!("vm: {}", instance.vm(v).name()));
    }
    for placement in solution.placements(model) {
        let job = instance.job(placement.job);
        let time = instance.time(placement.job, placement.pair_index);
        lines.push(format!(
            "deploy {} on {} with {} GPU(s), time {}, tardiness {}",
            job.name(),
            instance.vm(placement.pair.vm).name(),
            placement.pair.gpus,
            time,
            job.tardiness_for(time),
        ));
    }
    for j in solution.rejected_jobs(model) {
        let job = instance.job(j);
        lines.push(format!("reject {} (penalty {})", job.name(), job.penalty()));
    }

    lines.join("\n")
}

fn main() {
    // cargo run <instance_dir> [-t <seconds>] [-g <gap>] [-a auto|simplex|interior-point]
    // example : cargo run data/small -t 60
    logging::init();
    let matches: ArgMatches = build_cli_command().get_matches();

    let code = match run(&matches) {
        Ok((model, solution)) => {
            println!("{}", report(&model, &solution));
            match solution.status() {
                SolveStatus::Optimal | SolveStatus::Feasible => RunCode::Solved,
                SolveStatus::Infeasible | SolveStatus::Unbounded => RunCode::NoSolution,
                SolveStatus::Error(_) => RunCode::SolverFailure,
            }
        }
        Err(e) => {
            error!("{e:#}");
            RunCode::BadInput
        }
    };

    process::exit(code as i32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use single_node::InstanceData;

    #[test]
    fn test_command_line_arguments() {
        let matches = build_cli_command().try_get_matches_from(vec![
            "single-node",
            "data/small",
            "-t",
            "30",
            "-g",
            "0.01",
            "-a",
            "simplex",
        ]);

        assert!(matches.is_ok());
        let matches = matches.unwrap();

        assert_eq!(
            matches.get_one::<String>("instance_dir").unwrap(),
            "data/small"
        );

        let options = solver_options(&matches).unwrap();
        assert_eq!(options.time_limit, Some(Duration::from_secs(30)));
        assert_eq!(options.mip_gap, Some(0.01));
        assert_eq!(options.algorithm, Algorithm::Simplex);
    }

    #[test]
    fn test_command_line_defaults() {
        let matches = build_cli_command()
            .try_get_matches_from(vec!["single-node", "data/small"])
            .unwrap();

        assert_eq!(solver_options(&matches).unwrap(), SolverOptions::default());
    }

    #[test]
    fn test_negative_time_limit_is_refused() {
        let matches = build_cli_command()
            .try_get_matches_from(vec!["single-node", "data/small", "--time-limit=-5"])
            .unwrap();

        assert!(solver_options(&matches).is_err());
    }

    #[test]
    fn test_report_lists_placements() {
        let mut data = InstanceData::new();
        data.add_vm("g4dn", 2, 1.0)
            .add_job("resnet", 10.0, 100.0, 5.0)
            .set_time("resnet", "g4dn", 1, 5.0)
            .set_time("resnet", "g4dn", 2, 3.0);
        let model = build(&data).unwrap();
        let solution = MicroLpSolver.solve(&model, &SolverOptions::default());

        assert_eq!(
            report(&model, &solution),
            "status: optimal\n\
             objective: 3.000\n\
             vm: g4dn\n\
             deploy resnet on g4dn with 2 GPU(s), time 3, tardiness 0"
        );
    }
}
