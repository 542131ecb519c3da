//! linsvm Command Line Interface
//!
//! Demo driver: generates two Gaussian clusters, fits a linear SVM with the
//! selected solver and reports the separating hyperplane and its support
//! vectors.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use linsvm::api::SVM;
use linsvm::core::{BfgsConfig, BiasPenalty, LinearModel, ObjectiveParams, PegasosConfig, Result};
use linsvm::data::GaussianBlobs;
use linsvm::objective::{Order, SvmObjective};
use linsvm::utils::gradcheck::{check_gradient, check_hessian, DerivativeCheck};
use linsvm::utils::stats::DEFAULT_SUPPORT_TOLERANCE;
use linsvm::{Dataset, SVMError};
use log::{error, info};
use ndarray::Array1;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "linsvm")]
#[command(about = "Linear SVM demo: hinge/Huber objective with BFGS or Pegasos")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "linsvm contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a linear SVM on synthetic data and report the hyperplane
    Train(TrainArgs),
    /// Compare analytic derivatives with finite differences
    Check(CheckArgs),
}

#[derive(Args, Clone)]
struct DataArgs {
    /// Samples per class
    #[arg(short = 'n', long, default_value = "500")]
    samples: usize,

    /// Translation between the cluster centres, comma separated
    #[arg(long, value_delimiter = ',', default_value = "10,0")]
    separation: Vec<f64>,

    /// Standard deviation of each cluster
    #[arg(long, default_value = "1.0")]
    std_dev: f64,

    /// Random seed for data generation
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Args, Clone)]
struct ObjectiveArgs {
    /// Weight regularization lambda
    #[arg(short, long, default_value = "10.0")]
    lambda: f64,

    /// Bias regularization lambda0
    #[arg(long, default_value = "0.0")]
    lambda0: f64,

    /// Huber band half-width (0 selects the plain hinge loss)
    #[arg(long, default_value = "0.0")]
    huber: f64,

    /// Fit without an intercept
    #[arg(long)]
    no_bias: bool,

    /// When lambda0 is applied to the bias
    #[arg(long, default_value = "positive")]
    bias_penalty: CliBiasPenalty,
}

impl ObjectiveArgs {
    fn params(&self) -> ObjectiveParams {
        ObjectiveParams {
            lambda: self.lambda,
            lambda0: self.lambda0,
            huber: self.huber,
            bias_penalty: self.bias_penalty.clone().into(),
        }
    }
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    objective: ObjectiveArgs,

    /// Solver to use
    #[arg(long, default_value = "bfgs")]
    solver: CliSolver,

    /// Maximum iterations (BFGS) or number of steps (Pegasos)
    #[arg(short, long)]
    max_iterations: Option<usize>,

    /// Pegasos mini-batch size
    #[arg(long, default_value = "10")]
    batch_size: usize,

    /// Disable the Pegasos projection step
    #[arg(long)]
    no_projection: bool,

    /// Report samples with margin below 1 + huber + tolerance as support vectors
    #[arg(long, default_value_t = DEFAULT_SUPPORT_TOLERANCE)]
    support_tolerance: f64,

    /// Report format
    #[arg(short, long, default_value = "text")]
    format: CliFormat,

    /// Also write the JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    objective: ObjectiveArgs,

    /// Finite-difference step
    #[arg(long, default_value = "1e-6")]
    step: f64,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliSolver {
    /// Quasi-Newton on the full objective
    #[value(name = "bfgs")]
    Bfgs,
    /// Stochastic sub-gradient on mini-batches
    #[value(name = "pegasos")]
    Pegasos,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliBiasPenalty {
    /// Penalize the bias only when it is positive
    #[value(name = "positive")]
    Positive,
    /// Always penalize the bias
    #[value(name = "always")]
    Always,
}

impl From<CliBiasPenalty> for BiasPenalty {
    fn from(cli_penalty: CliBiasPenalty) -> Self {
        match cli_penalty {
            CliBiasPenalty::Positive => BiasPenalty::Positive,
            CliBiasPenalty::Always => BiasPenalty::Always,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
enum CliFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

/// Summary of a training run
#[derive(Serialize)]
struct TrainReport {
    generated_at: DateTime<Utc>,
    solver: String,
    n_samples: usize,
    dim: usize,
    lambda: f64,
    lambda0: f64,
    huber: f64,
    theta: Vec<f64>,
    bias: Option<f64>,
    objective_value: f64,
    iterations: usize,
    n_support_vectors: usize,
    support_tolerance: f64,
    support_ratio: f64,
    margin_violations: usize,
    accuracy: f64,
    precision: f64,
    recall: f64,
    support_vector_indices: Vec<usize>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Check(args) => check_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn generate(args: &DataArgs) -> Result<Dataset> {
    info!(
        "Generating {} samples per class, separation {:?}, seed {}",
        args.samples, args.separation, args.seed
    );
    GaussianBlobs::new(args.samples, args.separation.clone())
        .with_std_dev(args.std_dev)
        .with_seed(args.seed)
        .generate()
}

fn train_command(args: TrainArgs) -> Result<()> {
    let dataset = generate(&args.data)?;
    let params = args.objective.params();

    let mut svm = SVM::new()
        .with_lambda(params.lambda)
        .with_lambda0(params.lambda0)
        .with_huber(params.huber)
        .with_bias_penalty(params.bias_penalty)
        .with_bias(!args.objective.no_bias)
        .with_support_tolerance(args.support_tolerance);

    svm = match args.solver {
        CliSolver::Bfgs => {
            let mut config = BfgsConfig::default();
            if let Some(max_iterations) = args.max_iterations {
                config.max_iterations = max_iterations as u64;
            }
            svm.with_bfgs(config)
        }
        CliSolver::Pegasos => {
            let mut config = PegasosConfig {
                batch_size: args.batch_size,
                project: !args.no_projection,
                seed: args.data.seed,
                ..Default::default()
            };
            if let Some(max_iterations) = args.max_iterations {
                config.iterations = max_iterations;
            }
            svm.with_pegasos(config)
        }
    };

    let model = svm.train(&dataset)?;
    info!("Training completed successfully");

    let model_info = model.info();
    let metrics = model.evaluate_detailed(&dataset);
    let report = TrainReport {
        generated_at: Utc::now(),
        solver: model.inner().solver_name().to_string(),
        n_samples: dataset.n_samples(),
        dim: dataset.dim(),
        lambda: params.lambda,
        lambda0: params.lambda0,
        huber: params.huber,
        support_ratio: model.inner().summary().support_ratio(dataset.n_samples()),
        theta: model_info.theta,
        bias: model_info.bias,
        objective_value: model_info.objective_value,
        iterations: model_info.iterations,
        n_support_vectors: model_info.n_support_vectors,
        support_tolerance: args.support_tolerance,
        margin_violations: model_info.margin_violations,
        accuracy: metrics.accuracy(),
        precision: metrics.precision(),
        recall: metrics.recall(),
        support_vector_indices: model_info.support_vector_indices,
    };

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = &args.output {
        fs::write(path, &json)?;
        info!("Report saved to: {}", path.display());
    }

    match args.format {
        CliFormat::Json => println!("{json}"),
        CliFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &TrainReport) {
    println!("=== Linear SVM ({}) ===", report.solver);
    println!(
        "Data: {} samples, {} dimensions",
        report.n_samples, report.dim
    );
    println!(
        "Objective: lambda={}, lambda0={}, huber={}",
        report.lambda, report.lambda0, report.huber
    );

    let terms: Vec<String> = report
        .theta
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{w:+.6}*x{i}"))
        .collect();
    println!(
        "\nHyperplane: {} {:+.6} = 0",
        terms.join(" "),
        report.bias.unwrap_or(0.0)
    );

    println!("\nObjective value:   {:.6}", report.objective_value);
    println!("Iterations:        {}", report.iterations);
    println!(
        "Support vectors:   {} ({:.2}%)",
        report.n_support_vectors,
        report.support_ratio * 100.0
    );
    println!("Margin violations: {}", report.margin_violations);
    println!("Training accuracy: {:.2}%", report.accuracy * 100.0);
    println!("Precision:         {:.4}", report.precision);
    println!("Recall:            {:.4}", report.recall);

    let n_show = report.support_vector_indices.len().min(10);
    if n_show > 0 {
        println!(
            "\nFirst support vectors: {:?}",
            &report.support_vector_indices[..n_show]
        );
        if report.support_vector_indices.len() > n_show {
            println!(
                "  ... ({} more)",
                report.support_vector_indices.len() - n_show
            );
        }
    }
}

fn check_command(args: CheckArgs) -> Result<()> {
    if !(args.step.is_finite() && args.step > 0.0) {
        return Err(SVMError::InvalidParameter(format!(
            "finite-difference step must be positive, got: {}",
            args.step
        )));
    }

    let dataset = generate(&args.data)?;
    let objective = SvmObjective::new(&dataset, args.objective.params())?;

    let mut rng = SmallRng::seed_from_u64(args.data.seed.wrapping_add(1));
    let theta: Array1<f64> = Array1::random_using(dataset.dim(), StandardNormal, &mut rng) * 0.1;
    let bias = (!args.objective.no_bias).then_some(0.5);
    let model = LinearModel::new(theta, bias);
    objective.check_point(model.theta.view(), model.bias)?;

    let eval = objective.evaluate_model(&model, Order::Value);
    println!("=== Derivative Check ===");
    println!("Objective value:     {:.8}", eval.value);
    println!("Support samples:     {}", eval.active.n_support());
    println!("Quadratic-band size: {}", eval.active.n_quadratic());

    print_check("Gradient", &check_gradient(&objective, &model, args.step));
    if objective.loss().is_smoothed() {
        print_check("Hessian", &check_hessian(&objective, &model, args.step));
    }

    Ok(())
}

fn print_check(name: &str, check: &DerivativeCheck) {
    println!(
        "{name}: {} entries, max abs error {:.3e}, max rel error {:.3e}",
        check.n_entries, check.max_abs_error, check.max_rel_error
    );
}
