use std::io::{self, BufReader, Write};
use std::process::exit;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use treedecomposition_heuristic::{
    parse_gr, parse_hgr, parse_lp, write_human, write_td, write_width, DecompositionOptions,
    FitnessEvaluation, Hypergraph, ManagementInstance, OrderingAlgorithm, ProgressCallback,
    TreeDecomposition, WidthFitness, WidthMinimizingAlgorithm,
};

/// Computes a tree decomposition of the graph read on stdin and writes it to
/// stdout.
#[derive(Parser, Debug)]
#[command(name = "treedecomp", version)]
struct Cli {
    /// Seed for the random number generator; seeded from the wall clock when
    /// absent
    #[arg(long, value_name = "S")]
    seed: Option<u64>,

    /// Format of the input graph
    #[arg(long, value_enum, default_value_t = InputFormat::Gr, value_name = "format")]
    input: InputFormat,

    /// Output format of the decomposition
    #[arg(long, value_enum, default_value_t = OutputFormat::Td, value_name = "format")]
    output: OutputFormat,

    /// Kind of decomposition to compute
    #[arg(long = "type", value_enum, default_value_t = DecompositionType::Tree, value_name = "type")]
    decomposition_type: DecompositionType,

    /// Base elimination ordering algorithm
    #[arg(long, value_enum, default_value_t = OrderingChoice::MinFillPlus, value_name = "algorithm")]
    ordering: OrderingChoice,

    /// Iteratively compute a decomposition optimizing the given criterion
    #[arg(long, value_enum, default_value_t = OptimizationChoice::None, value_name = "criterion")]
    opt: OptimizationChoice,

    /// Number of optimization iterations, 0 keeps iterating until cancelled
    /// (only with --opt width, default 10)
    #[arg(long, value_name = "N")]
    iterations: Option<usize>,

    /// Abort after N consecutive non-improving iterations, -1 disables the
    /// cutoff (only with --opt width)
    #[arg(long, value_name = "N")]
    non_improvement_limit: Option<i64>,

    /// Print a comment line for every improved decomposition
    /// (only with --opt width)
    #[arg(long)]
    print_opt_progress: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Gr,
    Lp,
    Hgr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Td,
    Human,
    Width,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DecompositionType {
    Tree,
    Hypertree,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OrderingChoice {
    #[value(name = "min-fill+")]
    MinFillPlus,
    #[value(name = "min-fill")]
    MinFill,
    #[value(name = "min-degree")]
    MinDegree,
    #[value(name = "max-cardinality")]
    MaxCardinality,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OptimizationChoice {
    None,
    Width,
}

fn main() {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let code = match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = error.print();
            exit(code);
        }
    };
    exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    if let Some(message) = validate(&cli) {
        eprintln!("INVALID PROGRAM CALL: {}", message);
        return 1;
    }

    let stdin = io::stdin();
    let reader = BufReader::new(stdin.lock());
    let graph = match cli.input {
        InputFormat::Gr => parse_gr(reader),
        InputFormat::Hgr => parse_hgr(reader),
        InputFormat::Lp => parse_lp(reader).map(|(graph, _names)| graph),
    };
    let graph = match graph {
        Ok(graph) => graph,
        Err(error) => {
            eprintln!("MALFORMED INPUT: {}", error);
            return 2;
        }
    };

    let mut management = match cli.seed {
        Some(seed) => ManagementInstance::with_seed(seed),
        None => ManagementInstance::from_wall_clock(),
    };
    let mut algorithm = match cli.ordering {
        OrderingChoice::MinFillPlus => OrderingAlgorithm::advanced_min_fill(),
        OrderingChoice::MinFill => OrderingAlgorithm::MinFill,
        OrderingChoice::MinDegree => OrderingAlgorithm::MinDegree,
        OrderingChoice::MaxCardinality => OrderingAlgorithm::MaxCardinality,
    };
    let minimizer = WidthMinimizingAlgorithm {
        iterations: match cli.opt {
            OptimizationChoice::None => 1,
            OptimizationChoice::Width => cli.iterations.unwrap_or(10),
        },
        non_improvement_limit: cli
            .non_improvement_limit
            .and_then(|limit| usize::try_from(limit).ok()),
        options: DecompositionOptions::default(),
    };

    let mut report = |_: &Hypergraph, candidate: &TreeDecomposition, _: &FitnessEvaluation| {
        println!("c improved decomposition found, width {}", candidate.width());
    };
    let progress: Option<ProgressCallback<'_>> = if cli.print_opt_progress {
        Some(&mut report)
    } else {
        None
    };

    let decomposition = minimizer.compute_decomposition(
        &mut management,
        &graph,
        &mut algorithm,
        &WidthFitness,
        progress,
    );
    let Some(decomposition) = decomposition else {
        eprintln!("the computation was cancelled before the first decomposition finished");
        return 0;
    };

    match emit(cli.output, &graph, &decomposition) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("OUTPUT ERROR: {:#}", error);
            1
        }
    }
}

fn validate(cli: &Cli) -> Option<String> {
    if cli.decomposition_type == DecompositionType::Hypertree {
        return Some("hypertree decompositions are not supported by this build".to_string());
    }
    if cli.opt == OptimizationChoice::None {
        if cli.iterations.is_some() {
            return Some(
                "option --iterations may only be used when option --opt is set to \"width\""
                    .to_string(),
            );
        }
        if cli.non_improvement_limit.is_some() {
            return Some(
                "option --non-improvement-limit may only be used when option --opt is set to \"width\""
                    .to_string(),
            );
        }
        if cli.print_opt_progress {
            return Some(
                "option --print-opt-progress may only be used when option --opt is set to \"width\""
                    .to_string(),
            );
        }
    }
    None
}

fn emit(
    format: OutputFormat,
    graph: &Hypergraph,
    decomposition: &TreeDecomposition,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    match format {
        OutputFormat::Td => write_td(&mut writer, graph, decomposition),
        OutputFormat::Human => write_human(&mut writer, decomposition),
        OutputFormat::Width => write_width(&mut writer, decomposition),
    }
    .context("writing the decomposition to stdout")?;
    writer.flush().context("flushing stdout")?;
    Ok(())
}
