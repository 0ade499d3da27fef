use std::fs;
use std::process::exit;

use cpu_time::ProcessTime;

use sbdd_rs::bdd::{Bdd, DEFAULT_COMPUTED_TABLE_SIZE, DEFAULT_UNIQUE_TABLE_SIZE};
use sbdd_rs::circuit::synthesize;
use sbdd_rs::trace::Module;

/// Peak resident set size as reported by the kernel (KiB on Linux).
#[cfg(unix)]
fn peak_rss() -> i64 {
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    usage.ru_maxrss as i64
}

#[cfg(not(unix))]
fn peak_rss() -> i64 {
    0
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <trace-file>", args[0]);
        exit(-1);
    }
    let text = match fs::read_to_string(&args[1]) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("The file could not be opened: {}: {}", args[1], e);
            exit(-1);
        }
    };

    println!("sbdd version {}", env!("CARGO_PKG_VERSION"));

    let start = ProcessTime::now();

    let module = Module::parse(&text)?;
    let mut bdd = Bdd::new(
        module.inputs.len() as u32,
        DEFAULT_UNIQUE_TABLE_SIZE,
        DEFAULT_COMPUTED_TABLE_SIZE,
    );
    let outputs = synthesize(&mut bdd, &module)?;
    let node_count: usize = outputs.iter().map(|&f| bdd.count_nodes(f)).sum();

    let elapsed = start.elapsed();

    println!("Primary inputs: {}", module.inputs.len());
    println!("Nodes count: {}", node_count);
    println!("Time in seconds: {}", elapsed.as_secs_f64());
    println!("Memory usage: {}", peak_rss());

    Ok(())
}
