use clap::Parser;
use itertools::Itertools;
use std::fs;
use std::path::Path;
use std::process;
use waza::prelude::*;

/// Ability inspector: loads a packed ability (or a raw graph JSON), runs
/// it once in a scratch system and reports how every flow came out.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to an ability pack, or with --graph a single graph JSON file
    ability_path: String,

    /// Optional path to a JSON array of stat definitions
    #[arg(short, long)]
    stats: Option<String>,

    /// Treat the input as a raw graph JSON instead of a binary pack
    #[arg(short, long)]
    graph: bool,

    /// Print the registered node types and exit
    #[arg(short, long)]
    list_nodes: bool,
}

/// Ticks granted to paused flows before giving up on them.
const TICK_LIMIT: u32 = 64;

fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let definitions = match &cli.stats {
        Some(path) => load_stat_definitions(path),
        None => Vec::new(),
    };
    let mut system = AbilitySystem::builder()
        .with_stat_definitions(definitions)
        .build();

    if cli.list_nodes {
        let names = system.registry().type_names().sorted_unstable().join("\n");
        println!("{names}");
        return;
    }

    let data = load_ability(&cli);
    println!("Loaded ability '{}' ({} flows)", data.name(), data.graph_jsons().len());

    let handle = system.get_ability(&data);
    if !system.try_enqueue_ability(handle, None) {
        eprintln!("No flow of '{}' was eligible to run", data.name());
        process::exit(1);
    }

    if let Err(err) = system.run() {
        eprintln!("Run failed: {err}");
        process::exit(1);
    }

    let mut ticks = 0;
    while system.running_state() == RunningState::Pause {
        if ticks >= TICK_LIMIT {
            eprintln!("A flow is still paused after {TICK_LIMIT} ticks, stopping");
            break;
        }
        ticks += 1;
        if let Err(err) = system.tick() {
            eprintln!("Tick failed: {err}");
            process::exit(1);
        }
    }

    report(&system, handle);
}

fn load_ability(cli: &Cli) -> AbilityData {
    if cli.graph {
        let json = match fs::read_to_string(&cli.ability_path) {
            Ok(json) => json,
            Err(err) => {
                eprintln!("Could not read '{}': {err}", cli.ability_path);
                process::exit(1);
            }
        };
        let name = Path::new(&cli.ability_path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("ability")
            .to_owned();
        AbilityData::new(name).with_graph(json)
    } else {
        match AbilityData::from_file(&cli.ability_path) {
            Ok(data) => data,
            Err(err) => {
                eprintln!("{err}");
                process::exit(1);
            }
        }
    }
}

fn load_stat_definitions(path: &str) -> Vec<StatDefinition> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("Could not read '{path}': {err}");
            process::exit(1);
        }
    };
    match serde_json::from_str(&json) {
        Ok(definitions) => definitions,
        Err(err) => {
            eprintln!("Could not parse stat definitions: {err}");
            process::exit(1);
        }
    }
}

fn report(system: &AbilitySystem, handle: AbilityHandle) {
    let Some(ability) = system.ability(handle) else {
        return;
    };
    for index in 0..ability.flow_count() {
        let Some(flow) = ability.flow(index) else {
            continue;
        };
        match flow.current_node_id() {
            Some(node) => println!("flow {index}: {} (at node {node})", flow.current_state()),
            None => println!("flow {index}: {}", flow.current_state()),
        }
    }
    if system.pending_events() > 0 {
        println!("{} event(s) still buffered", system.pending_events());
    }
}
