use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use pc_core::repository::PROJECTS_FILE;
use pc_core::{ConnectionGraph, FrameId, FrameStore, JsonFileRepository, ProjectRepository};
use pc_render::{DirectorySink, ExportConfig, ExportRenderer, FsImageSource};

#[derive(Parser, Debug)]
#[command(name = "postcraft", version)]
struct Cli {
    /// Project store file.
    #[arg(long, global = true, default_value = PROJECTS_FILE)]
    store: PathBuf,

    /// Owner whose projects are read.
    #[arg(long, global = true, default_value = "local")]
    owner: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored projects, newest first.
    List,
    /// Export frames of a project as full-resolution PNGs.
    Export(ExportArgs),
    /// Print the connection graph of a project.
    Graph(GraphArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Project id.
    project: String,

    /// Frame ids to export (default: all frames).
    #[arg(long = "frame")]
    frames: Vec<String>,

    /// Output directory.
    #[arg(long, default_value = "export")]
    out: PathBuf,

    /// Root that site-relative image references resolve against.
    #[arg(long, default_value = "public")]
    assets: PathBuf,

    /// Extra font directories.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Do not load system fonts.
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,
}

#[derive(Parser, Debug)]
struct GraphArgs {
    /// Project id.
    project: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let repo = JsonFileRepository::new(&cli.store);
    match cli.cmd {
        Command::List => cmd_list(&repo, &cli.owner),
        Command::Export(args) => cmd_export(&repo, &cli.owner, args),
        Command::Graph(args) => cmd_graph(&repo, &cli.owner, args),
    }
}

fn load_store(repo: &JsonFileRepository, owner: &str, project: &str) -> anyhow::Result<FrameStore> {
    let project = repo
        .get(owner, project)
        .with_context(|| format!("load project '{project}' from '{}'", repo.path().display()))?;
    let frames = project
        .frames()
        .with_context(|| format!("decode frames of project '{}'", project.id))?;
    Ok(FrameStore::from_frames(frames))
}

fn cmd_list(repo: &JsonFileRepository, owner: &str) -> anyhow::Result<()> {
    let projects = repo
        .list(owner)
        .with_context(|| format!("read '{}'", repo.path().display()))?;
    if projects.is_empty() {
        eprintln!("no projects for {owner}");
    }
    for p in projects {
        let frames = match p.frames() {
            Ok(frames) => frames.len().to_string(),
            Err(e) => {
                log::warn!("project {}: {e}", p.id);
                "?".to_string()
            }
        };
        println!(
            "{}\t{}\t{frames} frames\t{}",
            p.id,
            p.title,
            p.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn cmd_export(repo: &JsonFileRepository, owner: &str, args: ExportArgs) -> anyhow::Result<()> {
    let store = load_store(repo, owner, &args.project)?;

    let ids: Vec<FrameId> = if args.frames.is_empty() {
        store.frames().iter().map(|f| f.id).collect()
    } else {
        let ids: Vec<FrameId> = args.frames.iter().map(|s| FrameId::intern(s)).collect();
        if let Some(missing) = ids.iter().find(|id| !store.contains(**id)) {
            bail!("project '{}' has no frame {missing}", args.project);
        }
        ids
    };
    if ids.is_empty() {
        bail!("project '{}' has no frames", args.project);
    }

    let renderer = ExportRenderer::new(ExportConfig {
        font_dirs: args.font_dirs,
        load_system_fonts: !args.no_system_fonts,
        ..ExportConfig::default()
    });
    let images = FsImageSource::new(&args.assets);
    let mut sink = DirectorySink::new(&args.out);

    for id in ids {
        let Some(frame) = store.get(id) else {
            continue;
        };
        let out = renderer
            .export(frame, &images, &mut sink)
            .with_context(|| format!("export frame {id}"))?;
        for skipped in &out.skipped_images {
            log::warn!("{}: left out {skipped}", out.file_name);
        }
    }
    for path in sink.written() {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_graph(repo: &JsonFileRepository, owner: &str, args: GraphArgs) -> anyhow::Result<()> {
    let store = load_store(repo, owner, &args.project)?;
    let graph = ConnectionGraph::derive(&store);

    fn print_tree(store: &FrameStore, graph: &ConnectionGraph, id: FrameId, depth: usize) {
        let name = store.get(id).map_or("?", |f| f.name.as_str());
        println!("{:indent$}{name} ({id})", "", indent = depth * 2);
        for child in graph.children(id) {
            print_tree(store, graph, child, depth + 1);
        }
    }

    for root in graph.roots() {
        print_tree(&store, &graph, root, 0);
    }
    if !graph.is_consistent_with(&store) {
        log::warn!("stored child lists disagree with parent links");
    }
    Ok(())
}
