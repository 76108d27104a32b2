use clap::Parser;
use dialoguer::Confirm;
use strain_dex::{cli, client, config, error, image_codec, render, server, shell};
use strain_dex::{AnalysisClient, Catalog, Detail, Dex, FileStorage, View};
use cli::{Cli, Commands};
use config::Config;
use error::{Result, StrainDexError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool, serving: bool) {
    let default_level = if verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_catalog(config: &Config) -> Result<Catalog<FileStorage>> {
    Ok(Catalog::new(FileStorage::new(config.data_dir()?)))
}

fn open_dex(config: &Config) -> Result<Dex<FileStorage, AnalysisClient>> {
    let client = AnalysisClient::new(&config.api_url)?;
    Ok(Dex::new(open_catalog(config)?, client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    let mut config = Config::load()?;
    cli.apply_overrides(&mut config);

    match cli.command {
        Commands::Serve { .. } => {
            server::serve(&config).await?;
        }

        Commands::Dex => {
            let mut dex = open_dex(&config)?;
            shell::run(&mut dex).await?;
        }

        Commands::Add { image, review, yes } => {
            println!("🌿 strain-dex - New Entry\n");
            let mut dex = open_dex(&config)?;

            // 1. 画像読み込み
            println!("[1/3] Reading image...");
            let data_uri = image_codec::encode_file(&image).await?;
            dex.add()?;
            dex.set_image(data_uri)?;
            dex.set_review(review)?;
            println!("✔ {}\n", image.display());

            // 2. 解析
            println!("[2/3] Analyzing ({})...", config.api_url);
            shell::submit_with_spinner(&mut dex).await?;
            let detail = match dex.view() {
                View::Detail(detail) => detail.clone(),
                View::Form(form) => {
                    let message = form
                        .error
                        .clone()
                        .unwrap_or_else(|| client::GENERIC_FAILURE.to_string());
                    return Err(StrainDexError::Analysis(message));
                }
                View::List => return Err(StrainDexError::Analysis(client::GENERIC_FAILURE.into())),
            };
            println!("✔ Analysis complete\n");
            println!("{}", render::render_detail(&detail));

            // 3. 保存
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Save to Dex?")
                    .default(true)
                    .interact()
                    .map_err(|e| StrainDexError::Prompt(e.to_string()))?;

            if confirmed {
                println!("[3/3] Saving...");
                let entry = dex.save()?;
                println!("✔ Saved: {} [{}]", render::entry_label(entry), entry.id);
            } else {
                dex.back()?;
                println!("Draft discarded");
            }
        }

        Commands::List => {
            let entries = open_catalog(&config)?.load();
            println!("{}", render::render_list(&entries));
            for entry in &entries {
                println!("  {}  {}", entry.id, render::entry_label(entry));
            }
        }

        Commands::Show { id, export_image } => {
            let entries = open_catalog(&config)?.load();
            let entry = entries
                .into_iter()
                .find(|e| e.id == id)
                .ok_or_else(|| StrainDexError::EntryNotFound(id.clone()))?;

            if let Some(path) = export_image {
                let written = image_codec::write_decoded(&entry.image, &path).await?;
                println!("✔ Image written: {} ({} bytes)\n", path.display(), written);
            }

            println!("{}", render::render_detail(&Detail::Persisted(entry)));
        }

        Commands::Config { show } => {
            if show {
                println!("Settings:");
                println!("  Config file: {}", Config::config_path()?.display());
                println!("  Model: {}", config.model);
                println!("  Model API: {}", config.gemini_base_url);
                println!("  Endpoint URL: {}", config.api_url);
                println!("  Bind address: {}", config.bind_address);
                println!("  Data dir: {}", config.data_dir()?.display());
                println!("  API key: {}", if config.api_key.is_some() { "set" } else { "not set" });
            }
        }
    }

    Ok(())
}
