use std::process;

use anyhow::{Context, Result};
use clap::{App, Arg};
use log::{error, info};

use isingsat::engine::{self, Engine};
use isingsat::wcnf;

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            -1
        }
    };

    process::exit(exit_code);
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn run() -> Result<i32> {
    let matches = App::new("isingsat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A CDCL solver that accepts an external continuous hint vector")
        .arg(Arg::with_name("INPUT").help("WCNF input file to solve").required(true))
        .arg(
            Arg::with_name("threshold")
                .long("threshold")
                .value_name("T")
                .help("Trap threshold; decisions at or below this activity return control")
                .takes_value(true),
        )
        .get_matches();

    let path = matches.value_of("INPUT").expect("INPUT is required");

    let mut engine = Engine::default();

    info!("reading '{}'", path);
    let parse_result = wcnf::parse(&mut engine, path)
        .with_context(|| format!("failed to parse '{}'", path))?;

    if parse_result == engine::UNSAT {
        println!("s UNSATISFIABLE");
        return Ok(engine::UNSAT);
    }

    if let Some(threshold) = matches.value_of("threshold") {
        let threshold: f64 = threshold.parse().context("--threshold must be a real number")?;
        engine.set_threshold(threshold);
    }

    match engine.solve_limited() {
        engine::SAT => {
            println!("s SATISFIABLE");
            print_model(&engine);
            Ok(engine::SAT)
        }
        engine::UNSAT => {
            println!("s UNSATISFIABLE");
            Ok(engine::UNSAT)
        }
        engine::TRAPPED => {
            // A bare CLI run has no external optimizer to refresh activity/phase, so a
            // trap can never be worked past on its own; report it rather than spin.
            info!("trapped: no decision variable exceeds the configured threshold");
            Ok(engine::TRAPPED)
        }
        other => unreachable!("unexpected solve_limited result code {}", other),
    }
}

fn print_model(engine: &Engine) {
    let model = engine.get_model();
    print!("v");
    for (i, value) in model.iter().enumerate() {
        let lit = (i as i32 + 1) * if *value < 0 { -1 } else { 1 };
        print!(" {}", lit);
    }
    println!(" 0");
}
