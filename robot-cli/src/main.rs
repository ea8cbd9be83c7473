use anyhow::Context;
use clap::Parser;
use log::info;
use robot::config::get_config;
use robot::parser;
use robot::program::Program;
use robot::search::SearchAlgorithm;
use robot::vm::{LineInput, Stats, VMOptions, WriteOutput};
use std::io::{BufRead, Write};
use std::time::Duration;

/// Run a Robot program.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// File containing a Robot program.
    #[arg()]
    file: String,
    /// File with the values for READ, one per line. Defaults to stdin.
    #[arg(long, short = 'i')]
    input: Option<String>,
    /// Maximum stack size.
    #[arg(long, short = 'm')]
    max_stack_size: Option<usize>,
    /// A limit for the number of executed operations.
    /// If the limit is reached, the program will be stopped with an error.
    #[arg(long, short = 'l')]
    op_limit: Option<u64>,
    /// Search algorithm used by REPLACEONE (boyer-moore, rabin-karp, naive).
    #[arg(long)]
    search: Option<SearchAlgorithm>,
    /// Print statistics after running the program.
    #[arg(long, short = 's')]
    stats: bool,
}

fn read_program_from_file(file: &str) -> Result<Program, anyhow::Error> {
    let source = std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;
    Ok(parser::parse_source(&source)?)
}

/// Input values are read lazily, one line per READ.
fn input_lines(file: Option<&str>) -> Result<LineInput<Box<dyn BufRead>>, anyhow::Error> {
    let reader: Box<dyn BufRead> = match file {
        Some(file) => {
            let file = std::fs::File::open(file).with_context(|| format!("Failed to open {file}"))?;
            Box::new(std::io::BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    };
    Ok(LineInput::new(reader))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = get_config()?;
    let mut options = VMOptions::from_config(config);
    if let Some(max_stack_size) = args.max_stack_size {
        options = options.with_max_stack_size(max_stack_size);
    }
    if let Some(op_limit) = args.op_limit {
        options = options.with_max_op_count(op_limit);
    }
    if let Some(search) = args.search {
        options = options.with_search(search);
    }

    let program = read_program_from_file(&args.file)?;
    info!("Running {} with {} search", args.file, options.search());
    let input = input_lines(args.input.as_deref())?;

    let stdout = std::io::stdout();
    let mut output = WriteOutput(stdout.lock());

    let start_time = std::time::Instant::now();
    let result = robot::vm::run_with_stats(&program, input, &mut output, &options, Stats::default());
    let elapsed = start_time.elapsed();
    output.0.flush()?;
    let result = result?;

    if args.stats {
        print_stats(&result.tracer, result.instruction_counter, elapsed);
    }

    Ok(())
}

fn print_stats(stats: &Stats, instruction_counter: u64, elapsed: Duration) {
    let instructions_per_second = instruction_counter as f64 / elapsed.as_secs_f64();
    eprintln!("Execution time: {:?}", elapsed);
    eprintln!(
        "Instructions executed: {} ({}/s)",
        instruction_counter,
        match instructions_per_second {
            n if n >= 1_000_000.0 => format!("{:.1}M", n / 1_000_000.0),
            n if n >= 1_000.0 => format!("{:.1}k", n / 1_000.0),
            n => format!("{:.1}", n),
        }
    );
    eprintln!("Max stack depth: {}, jumps taken: {}", stats.max_depth, stats.jumps_taken);
    let mut per_command: Vec<_> = stats.instructions.iter().collect();
    per_command.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (command, count) in per_command {
        eprintln!("  {command:<10} {count}");
    }
}
