use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use gitgood::areas::layout::{DEFAULT_METADATA_DIR, METADATA_DIR_ENV, RepositoryLayout};
use gitgood::areas::repository::Repository;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gitgood",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A minimal git-compatible object store",
    long_about = "Stores blobs and trees, and keeps a staging index, in the same formats git uses. \
    Objects written by gitgood can be read by git and the other way around.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short = 'C',
        long = "repo",
        global = true,
        help = "Run as if started in this directory"
    )]
    repo: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = METADATA_DIR_ENV,
        default_value = DEFAULT_METADATA_DIR,
        help = "Name of the metadata directory inside the working tree"
    )]
    git_dir_name: String,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the metadata directory in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "hash-object",
        about = "Compute the blob digest of a file and optionally store it",
        long_about = "This command prints the object id git would give the file's content. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "add",
        about = "Add file contents to the index",
        long_about = "This command stores each file as a blob and records it in the index. \
        Directories are added recursively."
    )]
    Add {
        #[arg(index = 1, required = true, num_args = 1.., help = "Files or directories to add")]
        paths: Vec<String>,
    },
    #[command(
        name = "ls-files",
        about = "Show the files in the index",
        long_about = "This command lists the paths recorded in the index, in index order."
    )]
    LsFiles {
        #[arg(short, long, help = "Show mode and object id of each entry")]
        stage: bool,
    },
    #[command(
        name = "write-tree",
        about = "Create tree objects and print the root tree id",
        long_about = "This command stores a tree object for every directory of the working tree \
        and prints the id of the root tree."
    )]
    WriteTree {
        #[arg(long, help = "Build the tree from the index instead of the working directory")]
        staged: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    gitgood::logging::init(cli.verbose);

    let root = match (&cli.command, cli.repo) {
        (Commands::Init { path: Some(path) }, _) => path.clone(),
        (_, Some(repo)) => repo,
        _ => std::env::current_dir()?,
    };
    let layout = RepositoryLayout::with_metadata_dir(root, cli.git_dir_name);
    let mut repository = Repository::new(layout, Box::new(std::io::stdout()))?;

    match &cli.command {
        Commands::Init { .. } => repository.init()?,
        Commands::HashObject { write, file } => {
            repository.hash_object(file, *write)?;
        }
        Commands::Add { paths } => repository.add(paths)?,
        Commands::LsFiles { stage } => repository.ls_files(*stage)?,
        Commands::WriteTree { staged } => repository.write_tree(*staged)?,
    }

    Ok(())
}
