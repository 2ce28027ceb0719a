// Copyright 2025 Planbench Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Planbench CLI - interactive plan comparison shell
//!
//! Loads a schema plus data directory, then reads decomposed query blocks
//! from an interactive prompt (or a file), generates every plan strategy's
//! plan, executes them all and reports estimated costs next to measured
//! execution times.

use std::fs;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table as DisplayTable};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use planbench::catalog::{loader, Catalog, Table};
use planbench::executor::Executor;
use planbench::graph::{
    dp_order, estimate_order_cost, execute_order, greedy_order, ikkbz_order, random_order,
    JoinGraph, Record, Relation,
};
use planbench::learned;
use planbench::planner::Planner;
use planbench::query::parse_query;
use planbench::Result;

/// Planbench query planning workbench
#[derive(Parser, Debug)]
#[command(name = "planbench")]
#[command(version)]
#[command(about = "Teaching-grade relational query engine with cost-based plan comparison")]
#[command(
    long_about = "Planbench loads a delimited-text schema and data directory, then reads\n\
decomposed query blocks and compares the plans its strategies generate.\n\n\
QUERY BLOCK FORMAT:\n\
  query_start\n\
  tables: movie, casts\n\
  scalar_filters: movie.id = 8854\n\
  dynamic_filters:\n\
  joins: movie.id = casts.mid\n\
  query_end\n\n\
Type 'quit' alone on a line to leave the shell."
)]
struct Args {
    /// Schema file (one `table(col type, ...)` declaration per line)
    #[arg(short = 's', long = "schema")]
    schema: Option<String>,

    /// Directory holding one pipe-delimited `<table>.txt` file per table
    #[arg(short = 'd', long = "data-dir")]
    data_dir: Option<String>,

    /// Read one query block from a file instead of the interactive shell
    #[arg(short = 'f', long = "query-file")]
    query_file: Option<String>,

    /// Maximum number of result rows to display (0 for unlimited)
    #[arg(short = 'l', long = "limit", default_value = "40")]
    limit: usize,

    /// Suppress plan traces, printing only the comparison summaries
    #[arg(short = 'q', long = "quiet", default_value = "false")]
    quiet: bool,

    /// Run the learned-index vs binary-search comparison and exit
    #[arg(long = "learned-demo", default_value = "false")]
    learned_demo: bool,

    /// Run the join-graph ordering comparison and exit
    #[arg(long = "graph-demo", default_value = "false")]
    graph_demo: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.learned_demo {
        run_learned_demo();
        return ExitCode::SUCCESS;
    }
    if args.graph_demo {
        return match run_graph_demo() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let (Some(schema), Some(data_dir)) = (&args.schema, &args.data_dir) else {
        eprintln!("Error: --schema and --data-dir are required (or use a --*-demo flag)");
        return ExitCode::FAILURE;
    };

    let mut catalog = Catalog::new();
    if let Err(e) = loader::load_directory(&mut catalog, schema, data_dir) {
        eprintln!("Error loading catalog: {}", e);
        return ExitCode::FAILURE;
    }
    for name in catalog.table_names() {
        println!(
            "Loaded table {} ({} rows)",
            name,
            catalog.table_size(name).unwrap_or(0)
        );
    }

    if let Some(query_file) = &args.query_file {
        let text = match fs::read_to_string(query_file) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading {}: {}", query_file, e);
                return ExitCode::FAILURE;
            }
        };
        let lines: Vec<String> = text.lines().map(String::from).collect();
        if let Err(e) = process_query(&lines, &catalog, &args) {
            eprintln!("Error processing query: {}", e);
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    run_shell(&catalog, &args)
}

/// The interactive shell: accumulate lines until `query_end`, then process
fn run_shell(catalog: &Catalog, args: &Args) -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error initializing shell: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Enter query blocks (query_start ... query_end); 'quit' to exit.");
    let mut block: Vec<String> = Vec::new();

    loop {
        let prompt = if block.is_empty() { "planbench> " } else { "........> " };
        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "quit" && block.is_empty() {
                    break;
                }
                block.push(line.clone());
                if trimmed == "query_end" {
                    let _ = editor.add_history_entry(block.join(" | "));
                    if let Err(e) = process_query(&block, catalog, args) {
                        eprintln!("Error processing query: {}", e);
                    }
                    block.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                block.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
    ExitCode::SUCCESS
}

/// Parse, plan, execute every plan, and report
fn process_query(lines: &[String], catalog: &Catalog, args: &Args) -> Result<()> {
    let components = parse_query(lines, catalog)?;
    println!("{}", components.summary());

    println!("\nGenerating query plans...");
    let plans = Planner::generate_all(catalog, &components)?;

    for generated in &plans {
        println!(
            "\n=== {} Plan (generated in {:.3} ms) ===",
            generated.strategy, generated.generation_ms
        );
        if !args.quiet {
            for line in &generated.plan.trace {
                println!("{}", line);
            }
        }
        println!("Total Estimated Cost: {:.2}", generated.plan.estimated_cost);
    }

    println!("\n=== Executing All Plans ===");
    let executor = Executor::new(catalog);
    let mut measurements: Vec<(&str, f64, usize)> = Vec::new();
    let mut best_result: Option<Table> = None;

    let best = Planner::best(&plans);
    for generated in &plans {
        let started = Instant::now();
        match executor.execute_plan(&generated.plan) {
            Ok(result) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
                measurements.push((generated.strategy, elapsed_ms, result.row_count()));
                if best.map(|b| b.strategy) == Some(generated.strategy) {
                    best_result = Some(result);
                }
            }
            Err(e) => {
                println!("{} plan did not execute: {}", generated.strategy, e);
            }
        }
    }

    let mut summary = DisplayTable::new();
    summary
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Strategy", "Estimated Cost", "Execution (ms)", "Rows"]);
    for (strategy, elapsed_ms, rows) in &measurements {
        let cost = plans
            .iter()
            .find(|p| p.strategy == *strategy)
            .map(|p| p.plan.estimated_cost)
            .unwrap_or(0.0);
        summary.add_row(vec![
            Cell::new(strategy),
            Cell::new(format!("{:.2}", cost)),
            Cell::new(format!("{:.3}", elapsed_ms)),
            Cell::new(rows),
        ]);
    }
    println!("\n=== Execution Time Summary ===\n{}", summary);

    if let Some(best) = best {
        println!(
            "\nBest Plan Selected: {} (Estimated Cost: {:.2})",
            best.strategy, best.plan.estimated_cost
        );
        println!("{}", best.plan.execution_order());
    }
    if let Some(result) = best_result {
        print_table(&result, args.limit);
    }
    Ok(())
}

/// Render a result table, truncated to the display limit
fn print_table(table: &Table, limit: usize) {
    let mut display = DisplayTable::new();
    display
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            table
                .columns
                .iter()
                .map(|c| Cell::new(c.qualified_name()))
                .collect::<Vec<_>>(),
        );

    let shown = if limit == 0 {
        table.rows.len()
    } else {
        table.rows.len().min(limit)
    };
    for row in &table.rows[..shown] {
        display.add_row(row.iter().map(|v| Cell::new(v.to_string())).collect::<Vec<_>>());
    }
    println!("{}", display);
    if shown < table.rows.len() {
        println!("... and {} more rows", table.rows.len() - shown);
    }
    println!("Total Rows: {}", table.rows.len());
}

/// Learned-index vs binary-search operation counts over random data
fn run_learned_demo() {
    const DATA_SIZE: usize = 1_000_000;
    const MAX_VALUE: i64 = 2_000_000;
    const SEARCHES: usize = 1_000;

    let report = learned::run_comparison(DATA_SIZE, MAX_VALUE, SEARCHES);
    println!("Comparison of Learned Index vs Binary Search");
    println!("Data size: {}, Searches performed: {}", DATA_SIZE, report.searches);
    println!();
    println!("Learned Index (linear regression + windowed binary search):");
    println!("  Total operations: {}", report.learned_operations);
    println!("  Avg operations per search: {:.2}", report.learned_average());
    println!();
    println!("Binary Search:");
    println!("  Total operations: {}", report.binary_operations);
    println!("  Avg operations per search: {:.2}", report.binary_average());
}

/// Join-order strategies compared over a generated six-relation chain
fn run_graph_demo() -> Result<()> {
    use rand::Rng;

    let mut graph = JoinGraph::new();
    for (name, size) in [
        ("A", 10_000usize),
        ("B", 15_000),
        ("C", 20_000),
        ("D", 5_000),
        ("E", 25_000),
        ("F", 8_000),
    ] {
        let mut rng = rand::thread_rng();
        let records = (0..size)
            .map(|i| Record {
                id: rng.gen_range(1..=(size as i64 * 10)),
                payload: format!("{}{}", name, i),
            })
            .collect();
        graph.add_relation(Relation {
            name: name.to_string(),
            size,
            records,
        });
    }
    graph.add_edge("A", "B", 0.1);
    graph.add_edge("B", "C", 0.05);
    graph.add_edge("C", "D", 0.2);
    graph.add_edge("D", "E", 0.15);
    graph.add_edge("E", "F", 0.1);

    let strategies: Vec<(&str, Vec<String>)> = vec![
        ("IKKBZ", ikkbz_order(&graph)?),
        ("Random", random_order(&graph)),
        ("Greedy", greedy_order(&graph)),
        ("DP", dp_order(&graph)?),
    ];

    for (name, order) in strategies {
        println!("{} Join Order: {}", name, order.join(" "));
        println!("Estimated Join Cost: {:.6}", estimate_order_cost(&graph, &order));

        let started = Instant::now();
        let result = execute_order(&graph, &order)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
        println!("Join Execution Time: {:.2} ms", elapsed_ms);
        println!("Final Result Size: {} records", result.len());
        println!();
    }
    Ok(())
}
