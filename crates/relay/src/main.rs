use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use motion::generators::SegmentDataGenerator;
use motion::geodesy::path_length;
use motion::path::{PathRequest, PathSynthesizer};
use motion::profiles::RunnerProfile;
use motion::sources::{GpxLoader, NoRoute, RouteLookup};
use motion::timing::TimingProfile;
use rand::SeedableRng;
use rand::rngs::StdRng;
use relay::client::{SessionPlan, SessionProtocolClient, now_ms, route_lookup};
use relay::config::RelayConfig;
use relay::pacing::TokioPacer;
use relay::params::{ModeParam, RunParams};
use relay::report::{Reporter, SessionReport};
use relay::transport::HttpTransport;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs synthesized sessions against the session server.
#[derive(Parser, Debug)]
#[command(name = "relay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one session and report the result to the orchestrator
    Run(RunArgs),
    /// Synthesize a trajectory and segments without contacting the server
    Synth(SynthArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Configuration file
    #[arg(long, env = "RELAY_CONFIG", default_value = "relay.toml")]
    config: PathBuf,

    /// Run parameters as a JSON object
    #[arg(long)]
    params: String,

    /// Order id for the callback when the parameters carry none
    #[arg(long)]
    order_id: Option<String>,

    /// Proxy for protocol calls; overrides both config and parameters
    #[arg(long, env = "RELAY_PROXY")]
    proxy: Option<String>,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Configuration file; synthesis defaults are used without one
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Run parameters as a JSON object
    #[arg(long, default_value = "{}")]
    params: String,

    /// Random seed, overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Write the timed trajectory to this GPX file
    #[arg(long)]
    export: Option<PathBuf>,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    match Cli::parse().command {
        Commands::Run(args) => {
            let report = run(args).await?;
            if !report.success {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Synth(args) => synth(args).await,
    }
}

/// Runs one session and sends exactly one callback when an order id and a
/// callback URL are known, whatever the outcome.
async fn run(args: RunArgs) -> Result<SessionReport> {
    let config = RelayConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let reporter = config
        .callback
        .as_ref()
        .map(|callback| Reporter::new(&callback.url))
        .transpose()
        .context("building callback client")?;

    let params = RunParams::from_json_str(&args.params);
    let order_id = params
        .as_ref()
        .ok()
        .and_then(|p| p.order_number.clone())
        .or(args.order_id.clone());

    let report = match params {
        Ok(params) => {
            let proxy = args.proxy.as_deref().or(params.proxy.as_deref());
            let config = config.with_proxy(proxy);
            match execute(config, params).await {
                Ok(report) => report,
                Err(e) => SessionReport::failed(format!("{e:#}"), 0),
            }
        }
        Err(e) => SessionReport::failed(e.to_string(), 0),
    };

    if report.success {
        info!(remark = %report.remark, "Run succeeded");
    } else {
        warn!(remark = %report.remark, error_code = report.error_code, "Run failed");
    }

    match (&reporter, order_id.as_deref()) {
        (Some(reporter), Some(order_id)) => reporter.report(order_id, &report).await,
        (None, _) => warn!("No callback configured; result not reported"),
        (_, None) => warn!("No order id; result not reported"),
    }
    Ok(report)
}

/// Errors before the session starts are returned; session failures are
/// folded into the report.
async fn execute(config: RelayConfig, params: RunParams) -> Result<SessionReport> {
    let config = Arc::new(config);
    let transport = HttpTransport::from_config(&config).context("building HTTP client")?;
    let mut client = SessionProtocolClient::new(config.clone(), Arc::new(transport), Arc::new(TokioPacer))?
        .with_credentials(params.credentials(&config.credentials));

    let recorded = params.recorded()?;
    let mode = match params.mode {
        ModeParam::Plan => match client.resolve_plan(params.plan_selection()).await {
            Ok(resolved) => Some((resolved.mode.clone(), resolved.fence_center())),
            Err(e) => return Ok(SessionReport::from_result(&Err(e), client.last_error_code())),
        },
        ModeParam::Free => None,
    };
    let (mode, origin) = match mode {
        Some(resolved) => resolved,
        None => {
            let Some(origin) = params.free_origin(recorded.as_ref(), config.default_origin) else {
                bail!("a free run needs an origin, a recorded trajectory or a configured default_origin");
            };
            (relay::RunMode::Free, origin)
        }
    };

    let plan = SessionPlan {
        mode,
        origin,
        totals: params.totals(),
        recorded,
        proof_reference: params.proof_reference.clone(),
    };
    let result = client.run(plan).await;
    Ok(SessionReport::from_result(&result, client.last_error_code()))
}

async fn synth(args: SynthArgs) -> Result<()> {
    let config = args
        .config
        .as_ref()
        .map(RelayConfig::from_file)
        .transpose()
        .context("loading configuration")?;
    let params = RunParams::from_json_str(&args.params)?;
    let recorded = params.recorded()?;

    let mut synthesis = config.as_ref().map(|c| c.synthesis.clone()).unwrap_or_default();
    if let Some(seed) = args.seed {
        synthesis.seed = Some(seed);
    }
    let mut rng = match synthesis.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let origin = params
        .free_origin(recorded.as_ref(), config.as_ref().and_then(|c| c.default_origin))
        .context("no origin: pass origin or trajectory_points, or set default_origin")?;
    let route: Arc<dyn RouteLookup> = match &config {
        Some(config) => route_lookup(config)?,
        None => Arc::new(NoRoute),
    };
    let synthesizer = PathSynthesizer::new(synthesis, route);

    let totals = params.totals();
    let mut request = PathRequest::around(origin).duration_hint(f64::from(totals.duration_s));
    if let Some(recorded) = recorded {
        request = request.recorded(recorded);
    }
    let path = synthesizer.synthesize(&request, &mut rng).await;

    let duration = f64::from(totals.duration_s);
    let timing = TimingProfile::new(RunnerProfile::for_session(f64::from(totals.distance_m), duration));
    let start = now_ms() - i64::from(totals.duration_s) * 1000;
    let trajectory = timing.attach_timing(&path.points, start, duration, 1, &mut rng);

    let widths = config.as_ref().map(|c| c.segments).unwrap_or_default();
    let segments = SegmentDataGenerator::with_widths(widths).generate(&totals);

    let positions: Vec<_> = trajectory.iter().map(|p| p.position).collect();
    println!("strategy:   {:?}", path.strategy);
    println!("points:     {}", trajectory.len());
    println!("length:     {:.0} m (declared {} m)", path_length(&positions), totals.distance_m);
    println!("duration:   {} s", totals.duration_s);
    println!(
        "segments:   {} pace, {} step, {} stride",
        segments.pace.len(),
        segments.steps.len(),
        segments.strides.len()
    );

    if let Some(export) = args.export {
        GpxLoader::write_file(&export, &trajectory, Some("relay dry run"))
            .with_context(|| format!("writing {}", export.display()))?;
        println!("exported:   {}", export.display());
    }
    Ok(())
}
