use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "motionbox", version)]
struct Cli {
    /// Log filter (`tracing` env-filter syntax).
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a scene and report whether it compiles.
    Check(CheckArgs),
    /// Render a single frame as JSON.
    Frame(FrameArgs),
    /// Render a frame range as JSON lines, one frame per line.
    Range(RangeArgs),
    /// List the capabilities scene code may call.
    Caps,
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input scene source JSON (`id`, `code`, optional `props` and `colors`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Optional capability options JSON (fps, canvas, duration_frames, limits, ...).
    #[arg(long)]
    options: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    #[command(flatten)]
    scene: SceneArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Props JSON merged over the declared props.
    #[arg(long)]
    props: Option<String>,
}

#[derive(Parser, Debug)]
struct RangeArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Last frame (exclusive). Defaults to the scene duration.
    #[arg(long)]
    end: Option<u64>,

    /// Render frames on a rayon pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads when `--parallel` is set.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Range(args) => cmd_range(args),
        Command::Caps => cmd_caps(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))
}

fn open_session(
    args: &SceneArgs,
    opts: motionbox::SessionOpts,
) -> anyhow::Result<motionbox::SceneSession> {
    let source: motionbox::SceneSource = read_json(&args.in_path, "scene source")?;
    let options = match &args.options {
        Some(p) => read_json(p, "capability options")?,
        None => motionbox::CapabilityOptions::default(),
    };
    Ok(motionbox::SceneSession::new(source, options, opts)?)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let session = open_session(&args.scene, motionbox::SessionOpts::default())?;
    match session.load_diagnostic() {
        None => {
            eprintln!("ok {}", session.scene_id());
            Ok(())
        }
        Some(diag) => {
            println!("{}", serde_json::to_string_pretty(&diag)?);
            anyhow::bail!("scene '{}' failed to load ({})", diag.scene_id, diag.kind.label())
        }
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let session = open_session(&args.scene, motionbox::SessionOpts::default())?;
    let props = match &args.props {
        Some(s) => serde_json::from_str(s).with_context(|| "parse --props JSON")?,
        None => serde_json::Value::Null,
    };
    let out = session.render_frame_with_props(motionbox::FrameIndex(args.frame), &props)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_range(args: RangeArgs) -> anyhow::Result<()> {
    let opts = motionbox::SessionOpts {
        parallel: args.parallel,
        threads: args.threads,
    };
    let session = open_session(&args.scene, opts)?;
    let end = args
        .end
        .unwrap_or(session.context().options().duration_frames);
    let range =
        motionbox::FrameRange::new(motionbox::FrameIndex(args.start), motionbox::FrameIndex(end))?;

    let frames = session.render_range(range)?;
    let diagnostics = frames.iter().filter(|f| f.is_diagnostic()).count();

    let mut w = BufWriter::new(std::io::stdout().lock());
    for f in &frames {
        serde_json::to_writer(&mut w, f)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;

    eprintln!(
        "rendered {} frames ({diagnostics} diagnostic)",
        range.len_frames()
    );
    Ok(())
}

fn cmd_caps() -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(motionbox::sandbox::capability::CAPABILITIES)?
    );
    Ok(())
}
