use clap::Parser;
use dialoguer::Confirm;
use fabric_map::{cleaner, cli, config, error, pipeline, records, review};

use cli::{Cli, Commands};
use config::Config;
use error::{FabricMapError, Result};
use pipeline::ReconcileContext;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Clean {
            input,
            output,
            qa,
            limit,
        } => {
            println!("🧼 fabric-map - clean\n");

            let output =
                output.unwrap_or_else(|| cleaner::default_output_path(&input, &config.model));
            let options = cleaner::CleanOptions {
                input,
                output,
                with_qa: qa,
                limit,
            };
            cleaner::run(&config, &options).await?;

            println!("\n✅ Cleaning complete");
        }

        Commands::Propose {
            input,
            workbook,
            library,
            catalog,
        } => {
            println!("🔎 fabric-map - propose\n");

            let ctx = reconcile_context(
                &config,
                input,
                workbook,
                library,
                catalog,
                None,
                cli.verbose,
            );
            pipeline::propose(&ctx)?;

            println!("\n✅ Proposal complete");
        }

        Commands::Apply {
            input,
            workbook,
            library,
            catalog,
            output,
        } => {
            println!("📥 fabric-map - apply\n");

            let ctx = reconcile_context(
                &config,
                input,
                workbook,
                library,
                catalog,
                output,
                cli.verbose,
            );
            pipeline::apply(&ctx)?;

            println!("\n✅ Reconciliation complete");
        }

        Commands::Run {
            input,
            workbook,
            library,
            catalog,
            output,
            yes,
        } => {
            println!("🚀 fabric-map - full reconciliation\n");

            let ctx = reconcile_context(
                &config,
                input,
                workbook,
                library,
                catalog,
                output,
                cli.verbose,
            );

            println!("[1/2] Proposing mappings...");
            pipeline::propose(&ctx)?;
            println!("✔ Proposal ready\n");

            if !yes {
                println!(
                    "✏️  Edit {} in a spreadsheet tool and save it.",
                    ctx.workbook.display()
                );
                let proceed = Confirm::new()
                    .with_prompt("Apply the reviewed sheet now?")
                    .default(true)
                    .interact()
                    .map_err(|e| FabricMapError::Prompt(e.to_string()))?;
                if !proceed {
                    println!(
                        "⏸️  Stopped before apply. Run 'fabric-map apply {}' when the sheet is ready.",
                        ctx.input.display()
                    );
                    return Ok(());
                }
            }

            println!("\n[2/2] Applying review...");
            pipeline::apply(&ctx)?;

            println!("\n✅ Reconciliation complete");
        }

        Commands::Config {
            set_model,
            set_endpoint,
            set_api_key,
            show,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(model) = set_model {
                config.set_model(model)?;
                println!("✔ Model updated");
                changed = true;
            }
            if let Some(endpoint) = set_endpoint {
                config.set_endpoint(endpoint)?;
                println!("✔ Endpoint updated");
                changed = true;
            }
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key updated");
                changed = true;
            }

            if show || !changed {
                println!("Settings:");
                println!("  model: {}", config.model);
                println!("  endpoint: {}", config.endpoint);
                println!(
                    "  api key: {}",
                    if config.api_key.is_some() { "set" } else { "not set" }
                );
                println!("  timeout: {}s", config.timeout_seconds);
                println!("  variant library: {}", config.exact_library);
                println!("  category catalog: {}", config.catalog);
                println!("  config file: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn reconcile_context(
    config: &Config,
    input: PathBuf,
    workbook: Option<PathBuf>,
    library: Option<PathBuf>,
    catalog: Option<PathBuf>,
    output: Option<PathBuf>,
    verbose: bool,
) -> ReconcileContext {
    ReconcileContext {
        workbook: workbook.unwrap_or_else(|| review::default_workbook_path(&input)),
        library_path: library.unwrap_or_else(|| PathBuf::from(&config.exact_library)),
        catalog_path: catalog.unwrap_or_else(|| PathBuf::from(&config.catalog)),
        output: output.unwrap_or_else(|| records::cleaned_path(&input)),
        input,
        verbose,
    }
}
