//! Templar CLI
//!
//! Thin glue over the resolver: forwards the resolved template, derived
//! schema, or manifest, and exits non-zero on any resolution error.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use templar::registry::{generate_manifest, verify_manifest, RegistryManifest};
use templar::{derive_input_schema, resolve};

#[derive(Parser)]
#[command(name = "templar")]
#[command(about = "Single-parent template inheritance resolver", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a template to its flattened form
    Resolve {
        /// Template reference (path, absolute or relative to --base-dir)
        template: String,

        /// Base directory for resolving relative references
        #[arg(long, short = 'b')]
        base_dir: Option<PathBuf>,

        /// Output YAML instead of JSON
        #[arg(long)]
        yaml: bool,
    },

    /// Derive the input schema from a resolved template
    Schema {
        /// Template reference
        template: String,

        /// Base directory for resolving relative references
        #[arg(long, short = 'b')]
        base_dir: Option<PathBuf>,

        /// Write the schema to a file instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Check that a template resolves, without printing the result
    Check {
        /// Template reference
        template: String,

        /// Base directory for resolving relative references
        #[arg(long, short = 'b')]
        base_dir: Option<PathBuf>,
    },

    /// Registry manifest commands
    Manifest {
        #[command(subcommand)]
        action: ManifestCommands,
    },
}

#[derive(Subcommand)]
enum ManifestCommands {
    /// Generate a manifest for every template under a registry root
    Generate {
        /// Registry root directory
        root: PathBuf,

        /// Output path (default: <root>/registry_manifest.json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the manifest to stdout without writing a file
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify a registry against its manifest
    Verify {
        /// Registry root directory
        root: PathBuf,

        /// Manifest path (default: <root>/registry_manifest.json)
        #[arg(long, short = 'm')]
        manifest: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(message) = run(cli) {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Resolve {
            template,
            base_dir,
            yaml,
        } => {
            let resolved =
                resolve(&template, &effective_base(base_dir)?).map_err(|e| e.to_string())?;
            let rendered = if yaml {
                resolved.to_yaml().map_err(|e| e.to_string())?
            } else {
                resolved.to_json().map_err(|e| e.to_string())?
            };
            println!("{}", rendered);
            Ok(())
        }

        Commands::Schema {
            template,
            base_dir,
            out,
        } => {
            let resolved =
                resolve(&template, &effective_base(base_dir)?).map_err(|e| e.to_string())?;
            let schema = derive_input_schema(&resolved).map_err(|e| e.to_string())?;
            let rendered = serde_json::to_string_pretty(&schema).map_err(|e| e.to_string())?;
            match out {
                Some(path) => std::fs::write(&path, rendered)
                    .map_err(|e| format!("cannot write {}: {}", path.display(), e))?,
                None => println!("{}", rendered),
            }
            Ok(())
        }

        Commands::Check { template, base_dir } => {
            let resolved =
                resolve(&template, &effective_base(base_dir)?).map_err(|e| e.to_string())?;
            println!(
                "ok: {} placeholders, {} sections",
                resolved.placeholders.len(),
                resolved.template.len()
            );
            Ok(())
        }

        Commands::Manifest { action } => match action {
            ManifestCommands::Generate {
                root,
                output,
                dry_run,
            } => {
                let manifest = generate_manifest(&root).map_err(|e| e.to_string())?;
                if dry_run {
                    println!("{}", manifest.to_json().map_err(|e| e.to_string())?);
                } else {
                    let output = output.unwrap_or_else(|| root.join("registry_manifest.json"));
                    manifest.write_to_file(&output).map_err(|e| e.to_string())?;
                    println!(
                        "wrote {} ({} entries)",
                        output.display(),
                        manifest.entries.len()
                    );
                }
                Ok(())
            }

            ManifestCommands::Verify { root, manifest } => {
                let manifest_path =
                    manifest.unwrap_or_else(|| root.join("registry_manifest.json"));
                let manifest =
                    RegistryManifest::from_file(&manifest_path).map_err(|e| e.to_string())?;
                verify_manifest(&root, &manifest).map_err(|e| e.to_string())?;
                println!("ok: {} entries verified", manifest.entries.len());
                Ok(())
            }
        },
    }
}

fn effective_base(base_dir: Option<PathBuf>) -> Result<PathBuf, String> {
    match base_dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().map_err(|e| format!("cannot determine cwd: {}", e)),
    }
}
