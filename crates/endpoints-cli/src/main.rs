use anyhow::{anyhow, bail, Context};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use carto_endpoints::{output, Command, Config};
use endpoints_client::{CkanClient, KnackClient};
use endpoints_core::{
    AppError, BennyPublisher, CartoConfig, CkanConfig, CkanPublisher, HttpConfig, KnackConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Setup logging (stderr to keep stdout clean for results and dry runs)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    // Parse command line arguments
    let config = Config::parse();
    let http = config.http_config();

    // Every configuration value a command needs is checked before the first request
    match &config.command {
        Command::Benny {
            carto_table,
            representation_id,
            geospatial,
        } => {
            let carto = config.carto_config().map_err(friendly)?;
            let knack = config.knack_config().map_err(friendly)?;
            benny(
                &carto,
                &knack,
                &http,
                carto_table,
                representation_id,
                *geospatial,
                config.dry_run,
            )
            .await?;
        }
        Command::Ckan {
            carto_table,
            ckan_slug,
            geospatial,
        } => {
            let carto = config.carto_config().map_err(friendly)?;
            let ckan_config = config.ckan_config().map_err(friendly)?;
            ckan(
                &carto,
                &ckan_config,
                &http,
                carto_table,
                ckan_slug,
                *geospatial,
                config.dry_run,
            )
            .await?;
        }
        Command::PushCkanAndBenny {
            carto_table,
            ckan_slug,
            representation_id,
            geospatial,
        } => {
            let carto = config.carto_config().map_err(friendly)?;
            let ckan_config = config.ckan_config().map_err(friendly)?;
            let knack = config.knack_config().map_err(friendly)?;

            ckan(
                &carto,
                &ckan_config,
                &http,
                carto_table,
                ckan_slug,
                *geospatial,
                config.dry_run,
            )
            .await?;
            benny(
                &carto,
                &knack,
                &http,
                carto_table,
                representation_id,
                *geospatial,
                config.dry_run,
            )
            .await?;
        }
    }

    Ok(())
}

fn friendly(e: AppError) -> anyhow::Error {
    anyhow!(e.user_message())
}

/// Create endpoint records for a Knack representation
async fn benny(
    carto: &CartoConfig,
    knack: &KnackConfig,
    http: &HttpConfig,
    carto_table: &str,
    representation_id: &str,
    geospatial: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = KnackClient::new(knack, http).map_err(friendly)?;
    let publisher = BennyPublisher::new(&client, carto, &knack.fields);

    if dry_run {
        let records = publisher
            .prepare(carto_table, representation_id, geospatial)
            .map_err(friendly)?;
        let json = output::knack_dry_run(client.records_url().as_str(), &records);
        println!("{}", serde_json::to_string_pretty(&json)?);
        info!("Dry run: {} Knack records not sent", records.len());
        return Ok(());
    }

    let summary = publisher
        .publish(carto_table, representation_id, geospatial)
        .await
        .map_err(friendly)?;

    for result in &summary.results {
        match &result.error {
            None => println!(
                "Created {} endpoint on representation {}",
                result.format, representation_id
            ),
            Some(e) => println!(
                "Failed to create {} endpoint on representation {}: {}",
                result.format, representation_id, e
            ),
        }
    }

    if !summary.all_created() {
        error!(
            "{} of {} endpoints failed on representation {}",
            summary.failed_count(),
            summary.results.len(),
            representation_id
        );
        bail!(
            "{} of {} endpoints could not be created",
            summary.failed_count(),
            summary.results.len()
        );
    }

    Ok(())
}

/// Replace the Carto resources of a CKAN dataset
async fn ckan(
    carto: &CartoConfig,
    ckan_config: &CkanConfig,
    http: &HttpConfig,
    carto_table: &str,
    ckan_slug: &str,
    geospatial: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = CkanClient::new(ckan_config, http).map_err(friendly)?;
    let publisher = CkanPublisher::new(&client, carto);

    if dry_run {
        let prepared = publisher
            .prepare(carto_table, ckan_slug, geospatial)
            .await
            .map_err(friendly)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&prepared.package.resources)?
        );
        info!(
            "Dry run: {} new resources, {} stale removed, package {} not updated",
            prepared.created, prepared.removed, ckan_slug
        );
        return Ok(());
    }

    let report = publisher
        .publish(carto_table, ckan_slug, geospatial)
        .await
        .map_err(friendly)
        .with_context(|| format!("Failed to republish CKAN package {}", ckan_slug))?;

    println!(
        "Created {} resources on slug {}",
        report.created, report.slug
    );
    if report.removed > 0 {
        println!(
            "Removed {} stale resources from {}",
            report.removed, report.title
        );
    }

    Ok(())
}
