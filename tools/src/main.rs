//! sim-runner: headless driver for the grid trading simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --commands 4,5,0,0,0,0,6,0,0,0,0
//!   sim-runner --seed 12345 --config data/sim_config.json --ipc-mode
//!
//! IPC mode reads one JSON object per line on stdin and answers each with
//! a snapshot JSON line on stdout:
//!   {"type":"reset"}  {"type":"step","command":3}  {"type":"get_state"}  {"type":"quit"}

use anyhow::Result;
use std::env;
use std::io::{self, BufRead, Write};
use tradegrid_core::{Command, SimConfig, SimEngine, SimSnapshot};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Reset,
    Step { command: u8 },
    GetState,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config = match find_arg(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut engine = SimEngine::new(config, seed)?;

    if ipc_mode {
        return run_ipc_loop(&mut engine);
    }

    let script = find_arg(&args, "--commands").unwrap_or("0");
    println!("Grid trader sim-runner");
    println!("  seed:      {seed}");
    println!("  commands:  {script}");
    println!();

    let commands = parse_script(script)?;
    let mut last = engine.snapshot();
    for command in commands {
        last = engine.advance_tick(command)?;
    }
    print_summary(&engine, &last);
    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                reply_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let snapshot = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Reset => engine.initialize()?,
            IpcCommand::GetState => engine.snapshot(),
            IpcCommand::Step { command } => match Command::from_code(command) {
                Ok(command) => engine.advance_tick(command)?,
                Err(e) => {
                    log::warn!("rejected step: {e}");
                    reply_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            },
        };
        writeln!(stdout, "{}", serde_json::to_string(&snapshot)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn reply_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn parse_script(script: &str) -> Result<Vec<Command>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| -> Result<Command> {
            let code: u8 = s
                .parse()
                .map_err(|e| anyhow::anyhow!("bad command code '{s}': {e}"))?;
            Ok(Command::from_code(code)?)
        })
        .collect()
}

fn print_summary(engine: &SimEngine, last: &SimSnapshot) {
    println!("=== RUN SUMMARY ===");
    println!("  final tick:   {}", last.tick);
    println!("  sim time:     {:.2}", last.time);
    println!("  cash:         {:.2}", last.cash);
    for unit in &last.units {
        println!(
            "  unit {}:       pos={} state={:?} busy={} items={}",
            unit.id,
            unit.position,
            unit.state,
            unit.busy_ticks,
            unit.inventory.total()
        );
    }
    println!();
    println!("=== MARKETS ===");
    for market in &last.markets {
        let prices: Vec<String> = market
            .prices
            .iter()
            .map(|(id, price)| {
                let name = engine
                    .config()
                    .product(*id)
                    .map(|p| p.name.as_str())
                    .unwrap_or("?");
                format!("{name}=${price:.2}")
            })
            .collect();
        println!("  {} at {} | {}", market.name, market.position, prices.join(", "));
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
