use clap::{Parser, Subcommand, ValueEnum};
use dt_app::{
    AppError, AppResult, ComparisonRow, ExperimentConfig, RunProgressEvent, RunStage,
    RunTimingSummary, TrialReport, query, run_service,
};
use dt_sim::DrainRecord;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Parser)]
#[command(name = "dt-cli")]
#[command(about = "Drain-time simulator for a bin emptying through an inclined tube", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare predicted drain times with the measured ones
    Compare {
        /// Include the T-joint minor loss
        #[arg(long)]
        t_joint: bool,
    },
    /// Simulate one drain run
    Run {
        /// Tube length in metres
        #[arg(long)]
        length: f64,
        /// Include the T-joint minor loss
        #[arg(long)]
        t_joint: bool,
        /// Time step in seconds (defaults to the experiment's)
        #[arg(long)]
        dt: Option<f64>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Average outlet velocity across a range of tube lengths
    Sweep {
        #[arg(long, default_value_t = 0.1)]
        from: f64,
        #[arg(long, default_value_t = 1.9)]
        to: f64,
        #[arg(long, default_value_t = 0.1)]
        step: f64,
        /// Include the T-joint minor loss
        #[arg(long)]
        t_joint: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Serialize)]
struct RunExport<'a> {
    report: &'a TrialReport,
    records: &'a [DrainRecord],
}

fn main() -> AppResult<()> {
    // Initialize tracing; logs go to stderr so csv/json output stays clean
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = ExperimentConfig::bin_drain_v1();

    match cli.command {
        Commands::Compare { t_joint } => cmd_compare(&config, t_joint),
        Commands::Run {
            length,
            t_joint,
            dt,
            format,
        } => cmd_run(&config, length, t_joint, dt, format),
        Commands::Sweep {
            from,
            to,
            step,
            t_joint,
        } => cmd_sweep(&config, from, to, step, t_joint),
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

fn cmd_compare(config: &ExperimentConfig, t_joint: bool) -> AppResult<()> {
    println!(
        "Comparing {} measured points ({})",
        config.measurements.len(),
        if t_joint { "with T-joint" } else { "no T-joint" }
    );

    let rows = run_service::compare_measured(config, t_joint)?;
    print_comparison(&rows);

    let summary = dt_app::summarize(&rows);
    println!();
    println!("  Predicted: {}/{}", summary.predicted, summary.points);
    println!(
        "  Mean |error|: {} %",
        fmt_opt(summary.mean_abs_percent_error, 1)
    );
    println!(
        "  Max |error|:  {} %",
        fmt_opt(summary.max_abs_percent_error, 1)
    );
    println!(
        "  Monotonic in length: {}",
        if summary.monotonic_in_length { "yes" } else { "no" }
    );
    Ok(())
}

fn print_comparison(rows: &[ComparisonRow]) {
    println!(
        "\n{:>8}  {:>12}  {:>12}  {:>10}  {:>8}  {}",
        "L [m]", "pred [s]", "meas [s]", "diff [s]", "err [%]", "state"
    );
    for row in rows {
        println!(
            "{:>8.2}  {:>12}  {:>12.1}  {:>10}  {:>8}  {}",
            row.tube_length_m,
            fmt_opt(row.predicted_time_s, 1),
            row.measured_time_s,
            fmt_opt(row.difference_s, 1),
            fmt_opt(row.percent_error, 1),
            row.state.label()
        );
        if let Some(failure) = &row.failure {
            println!("{:>8}  {failure}", "");
        }
    }
}

fn cmd_run(
    config: &ExperimentConfig,
    length: f64,
    t_joint: bool,
    dt: Option<f64>,
    format: OutputFormat,
) -> AppResult<()> {
    let mut config = config.clone();
    if let Some(dt) = dt {
        config.dt_s = dt;
    }

    let response = if format == OutputFormat::Table {
        println!(
            "Draining {:.3} m of water through a {:.2} m tube (dt = {} s)",
            config.level_drop_m, length, config.dt_s
        );
        let mut last_render = -1.0_f64;
        let response = run_service::run_trial_with_progress(
            &config,
            length,
            t_joint,
            Some(&mut |event: RunProgressEvent| {
                // Redraw at most every tenth of a wall second
                if event.drain.is_none() || event.elapsed_wall_s - last_render >= 0.1 {
                    last_render = event.elapsed_wall_s;
                    render_cli_progress(&event);
                }
            }),
        )?;
        clear_progress_line();
        response
    } else {
        run_service::run_trial(&config, length, t_joint)?
    };

    match format {
        OutputFormat::Table => {
            print_report(&response.report, &response.outcome.records);
            print_timing_summary(&response.timing);
        }
        OutputFormat::Csv => print!("{}", query::records_to_csv(&response.outcome.records)),
        OutputFormat::Json => {
            let export = RunExport {
                report: &response.report,
                records: &response.outcome.records,
            };
            let json = serde_json::to_string_pretty(&export)
                .map_err(|e| AppError::Output(e.to_string()))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn print_report(report: &TrialReport, records: &[DrainRecord]) {
    println!("✓ Run {}", report.state.label());
    println!("  Drain time: {} s", fmt_opt(report.predicted_time_s, 2));
    println!("  Elapsed:    {:.2} s", report.elapsed_s);
    println!("  Final level: {:.4} m", report.final_level_m);
    println!("  Steps: {}", report.steps);
    println!(
        "  Mean outlet velocity: {} m/s",
        fmt_opt(report.mean_outlet_velocity_mps, 4)
    );
    if let Ok(summary) = query::get_run_summary(records) {
        println!(
            "  Peak outlet velocity: {:.4} m/s",
            summary.peak_outlet_velocity_mps
        );
    }
    if let Some(failure) = &report.failure {
        println!("  Failure: {failure}");
    }
}

fn cmd_sweep(
    config: &ExperimentConfig,
    from: f64,
    to: f64,
    step: f64,
    t_joint: bool,
) -> AppResult<()> {
    let lengths = run_service::sweep_lengths(from, to, step)?;
    println!("Sweeping {} tube lengths from {from} m to {to} m", lengths.len());

    let points = run_service::sweep_average_velocity(config, &lengths, t_joint)?;

    println!(
        "\n{:>8}  {:>14}  {:>12}  {}",
        "L [m]", "mean v2 [m/s]", "time [s]", "state"
    );
    for p in &points {
        println!(
            "{:>8.2}  {:>14}  {:>12}  {}",
            p.tube_length_m,
            fmt_opt(p.mean_outlet_velocity_mps, 4),
            fmt_opt(p.drain_time_s, 1),
            p.state.label()
        );
        if let Some(failure) = &p.failure {
            println!("{:>8}  {failure}", "");
        }
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.drain) {
        (RunStage::Draining, Some(d)) => {
            let width = 28usize;
            let filled = ((d.fraction_drained * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.2}/{:.0}s  level={:.4}m  v2={:.4}m/s  elapsed={:.1}s",
                bar,
                d.fraction_drained * 100.0,
                d.sim_time_s,
                d.time_cap_s,
                d.level_m,
                d.v2_mps,
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(timing: &RunTimingSummary) {
    println!("\nTiming summary:");
    println!("  Validate: {:.3}s", timing.validate_time_s);
    println!("  Drain:    {:.3}s", timing.drain_time_s);
    println!("  Total:    {:.3}s", timing.total_time_s);
    if timing.drain_time_s > 0.0 {
        println!(
            "  Steps/s:  {:.0}",
            timing.steps as f64 / timing.drain_time_s
        );
    }
}
