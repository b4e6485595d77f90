use clap::{Parser, Subcommand};
use fragmenta::{DiskStore, FragmentService, Listing};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fragmenta", about = "Owner-scoped fragment storage with content-type conversion")]
struct Cli {
    /// Owner id every operation is scoped to
    #[arg(short, long)]
    owner: String,
    /// Store root directory
    #[arg(short, long, default_value = ".fragmenta")]
    root: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new fragment from a file's bytes
    Post {
        /// Content-Type of the payload (e.g. "text/markdown")
        #[arg(short = 't', long = "type")]
        content_type: String,
        input: PathBuf,
    },
    /// List fragment ids, or full metadata records with --expand
    List {
        #[arg(short, long)]
        expand: bool,
    },
    /// Print a fragment's bytes; append an extension to convert (`<id>.html`)
    Get {
        /// Fragment id, optionally suffixed: `<id>` or `<id>.<ext>`
        target: String,
    },
    /// Print a fragment's metadata record
    Info {
        id: String,
    },
    /// Remove a fragment's metadata and data
    Delete {
        id: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let service = FragmentService::new(Box::new(DiskStore::new(&cli.root)));
    let owner = cli.owner.as_str();

    match cli.command {
        // ── Post ─────────────────────────────────────────────────────────────
        Commands::Post { content_type, input } => {
            let data = std::fs::read(&input)?;
            let fragment = service.create_fragment(owner, &content_type, &data)?;
            println!("{}", serde_json::to_string_pretty(&fragment)?);
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { expand } => {
            let listing = service.list_fragments(owner, expand)?;
            match &listing {
                Listing::Ids(ids) => {
                    for id in ids {
                        println!("{id}");
                    }
                }
                Listing::Full(_) => println!("{}", serde_json::to_string_pretty(&listing)?),
            }
        }

        // ── Get ──────────────────────────────────────────────────────────────
        Commands::Get { target } => {
            let bytes = match target.split_once('.') {
                Some((id, extension)) => {
                    let (bytes, mime) = service.read_fragment_converted(owner, id, extension)?;
                    eprintln!("converted to {mime}");
                    bytes
                }
                None => service.read_fragment_bytes(owner, &target)?,
            };
            std::io::stdout().write_all(&bytes)?;
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { id } => {
            let fragment = service.get_fragment(owner, &id)?;
            println!("{}", serde_json::to_string_pretty(&fragment)?);
        }

        // ── Delete ───────────────────────────────────────────────────────────
        Commands::Delete { id } => {
            service.delete_fragment(owner, &id)?;
            println!("Deleted: {id}");
        }
    }

    Ok(())
}
