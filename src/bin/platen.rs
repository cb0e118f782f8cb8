use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use platen::{
    CancelToken, FsModuleLoader, FsProviderLoader, ModuleLoader as _, Pipeline, ProviderLoader as _,
    RenderOpts, RenderRequest, ValueSource,
};

#[derive(Parser, Debug)]
#[command(name = "platen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a module release into ordered resource manifests.
    Render(RenderArgs),
    /// Print which transformers match each component, with reasons.
    Match(ReleaseArgs),
}

#[derive(Parser, Debug)]
struct ReleaseArgs {
    /// Module JSON file, or a directory containing `module.json`.
    #[arg(long)]
    module: PathBuf,

    /// Values file (JSON or YAML); repeat to layer overlays in order.
    #[arg(long = "values")]
    values: Vec<PathBuf>,

    /// Release name.
    #[arg(long)]
    name: String,

    /// Target namespace (defaults to the module's default namespace).
    #[arg(long, default_value = "")]
    namespace: String,

    /// Provider name, resolved as `<providers-dir>/<provider>.json`.
    #[arg(long)]
    provider: String,

    /// Directory holding provider files.
    #[arg(long, default_value = "providers")]
    providers_dir: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// Output file (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    release: ReleaseArgs,

    /// Treat unhandled traits as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Match(args) => cmd_match(args),
    }
}

fn load_values(paths: &[PathBuf]) -> anyhow::Result<Vec<ValueSource>> {
    paths
        .iter()
        .map(|p| {
            ValueSource::from_path(p).with_context(|| format!("load values '{}'", p.display()))
        })
        .collect()
}

fn write_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("write output '{}'", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

fn serialize<T: serde::Serialize>(format: Format, value: &T) -> anyhow::Result<String> {
    Ok(match format {
        Format::Json => {
            let mut s = serde_json::to_string_pretty(value).context("serialize JSON")?;
            s.push('\n');
            s
        }
        Format::Yaml => serde_yaml::to_string(value).context("serialize YAML")?,
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let release = args.release;
    let req = RenderRequest {
        module: release.module.to_string_lossy().to_string(),
        values: load_values(&release.values)?,
        release_name: release.name.clone(),
        namespace: release.namespace.clone(),
        provider: release.provider.clone(),
    };
    let pipeline = Pipeline::new(
        FsModuleLoader::new("."),
        FsProviderLoader::new(release.providers_dir.clone()),
        RenderOpts {
            strict: args.strict,
        },
    );

    let result = pipeline
        .render(&req, &CancelToken::new())
        .with_context(|| format!("render release '{}'", release.name))?;

    let text = match release.format {
        Format::Json => {
            let objects: Vec<_> = result.resources.iter().map(|r| r.object()).collect();
            serialize(Format::Json, &objects)?
        }
        Format::Yaml => {
            let mut s = String::new();
            for r in &result.resources {
                s.push_str("---\n");
                s.push_str(&serialize(Format::Yaml, r.object())?);
            }
            s
        }
    };
    write_output(release.out.as_deref(), &text)?;

    for w in &result.warnings {
        eprintln!("warning: {w}");
    }
    for e in &result.errors {
        eprintln!("error: {e}");
    }
    if result.has_errors() {
        anyhow::bail!("render finished with {} error(s)", result.errors.len());
    }
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct MatchReport {
    release: platen::ReleaseMetadata,
    #[serde(flatten)]
    plan: platen::MatchSummary,
    warnings: Vec<String>,
}

fn cmd_match(args: ReleaseArgs) -> anyhow::Result<()> {
    let location = args.module.to_string_lossy().to_string();
    let module = FsModuleLoader::new(".").load(&location)?;
    let provider = FsProviderLoader::new(args.providers_dir.clone()).load(&args.provider)?;
    let values = load_values(&args.values)?;

    let release = platen::build_release(&module, &values, &args.name, &args.namespace)?;
    let plan = platen::match_components(release.components(), &provider.transformers);
    let report = MatchReport {
        release: release.metadata().clone(),
        plan: plan.summary(),
        warnings: platen::collect_warnings(&plan),
    };
    write_output(args.out.as_deref(), &serialize(args.format, &report)?)
}
