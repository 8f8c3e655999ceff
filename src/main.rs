use cast_import::core::report::{render_conversion_summary, render_import_summary};
use cast_import::utils::{logger, validation::Validate};
use cast_import::{
    AppConfig, CityHeavenConverter, CliConfig, Command, EtlError, HttpCastApi, ImportPipeline,
    LocalStorage, Result,
};
use clap::Parser;
use std::path::Path;

fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn fail(e: &EtlError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn run_convert(config: &AppConfig) -> Result<()> {
    config.converter.validate()?;
    let converter = &config.converter;

    println!("Starting CityHeaven CSV conversion...");
    println!("Input: {}", converter.input_path);
    println!("Output: {}\n", converter.output_path);

    let stats = CityHeavenConverter::new()
        .with_columns(converter.columns.clone())
        .convert_file(
            Path::new(&converter.input_path),
            Path::new(&converter.output_path),
        )?;

    tracing::info!(
        converted = stats.converted,
        skipped = stats.skipped,
        "Conversion finished"
    );
    println!("{}", render_conversion_summary(&stats, &converter.output_path));
    Ok(())
}

fn build_pipeline(config: &AppConfig) -> Result<ImportPipeline<LocalStorage, HttpCastApi>> {
    config.api.validate()?;
    let credentials = config.api.credentials()?;
    Ok(ImportPipeline::new(
        LocalStorage::default(),
        HttpCastApi::new(&config.api.base_url),
        credentials,
    ))
}

async fn run_import(config: &AppConfig) -> Result<()> {
    let pipeline = build_pipeline(config)?;

    banner("🔄 Cast data re-import");
    let response = pipeline.run(&config.api.csv_path).await?;

    println!();
    banner("✅ Import succeeded!");
    println!("{}", render_import_summary(&response));

    banner("✅ Done");
    if let Some(site_url) = &config.api.site_url {
        let site_url = site_url.trim_end_matches('/');
        println!("\nCheck:");
        println!("  • Admin cast list: {}/admin/casts", site_url);
        println!("  • Public cast list: {}/casts", site_url);
    }
    Ok(())
}

async fn run_template(config: &AppConfig, output: &str) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let size = pipeline.download_template(output).await?;
    println!("✅ Template saved: {} ({} bytes)", output, size);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("Config file: {:?}", cli.config);

    let config = match cli.load_app_config() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let outcome = match &cli.command {
        Command::Convert { .. } => run_convert(&config),
        Command::Import { .. } => run_import(&config).await,
        Command::Template { output, .. } => run_template(&config, output).await,
    };

    if let Err(e) = outcome {
        fail(&e);
    }

    Ok(())
}
