use clap::Parser;
use provider_pipeline::core::catalog::{self, CatalogSortKey};
use provider_pipeline::utils::{logger, validation};
use provider_pipeline::{
    CliConfig, CsvUpload, LocalStorage, PipelineOrchestrator, PipelineRunResult,
    PipelineStatistics, Settings, StageClient, Storage,
};
use provider_pipeline::utils::validation::Validate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting provider-pipeline");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = settings.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let upload = match CsvUpload::from_path(&cli.input) {
        Ok(upload) => upload,
        Err(e) => {
            eprintln!("❌ Could not read {}: {}", cli.input.display(), e);
            std::process::exit(2);
        }
    };
    if let Err(e) = validation::validate_upload(&upload.candidate()) {
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let client = StageClient::new();
    let orchestrator = PipelineOrchestrator::new(client.clone(), settings.clone());

    println!("📤 Uploading {} ({} bytes)...", upload.name, upload.bytes.len());
    let receipt = match orchestrator.upload_initial_dataset(&upload).await {
        Ok(receipt) => receipt,
        Err(e) => {
            eprintln!("❌ Upload failed: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(info) = &receipt.data_info {
        tracing::info!(
            "Uploaded dataset: {} rows, {} columns",
            info.shape[0],
            info.shape[1]
        );
    }

    println!("⚙️  Running pipeline...");
    match orchestrator.run(Some(&upload)).await {
        PipelineRunResult::Completed {
            final_payload,
            elapsed_ms,
        } => {
            println!("✅ Pipeline completed in {} ms", elapsed_ms);
            match provider_pipeline::normalizer::normalize(&final_payload, None) {
                Ok(stats) => print_statistics(&stats),
                Err(e) => tracing::warn!("Could not normalize pipeline statistics: {}", e),
            }
        }
        PipelineRunResult::Failed {
            stage,
            message,
            elapsed_ms,
        } => {
            match stage {
                Some(stage) => {
                    eprintln!("❌ {} failed after {} ms: {}", stage, elapsed_ms, message)
                }
                None => eprintln!("❌ {}", message),
            }
            std::process::exit(1);
        }
    }

    match client.list_generated_files(&settings.base_url).await {
        Ok(mut files) => {
            catalog::sort_files(&mut files, CatalogSortKey::Timestamp);
            println!("📁 {} generated files:", files.len());
            for file in &files {
                println!(
                    "   {} [{}] {} records, {:.2} MB",
                    file.filename, file.step, file.records, file.size_mb
                );
            }

            if cli.download {
                let storage = LocalStorage::new(settings.output_path.clone());
                for file in &files {
                    match client.download_file(&settings.base_url, &file.filename).await {
                        Ok(bytes) => {
                            storage.write_file(&file.filename, &bytes).await?;
                            tracing::info!("Saved {}", file.filename);
                        }
                        Err(e) => tracing::warn!("Download of {} failed: {}", file.filename, e),
                    }
                }
                println!("📁 Artifacts saved to {}", settings.output_path);
            }
        }
        Err(e) => tracing::warn!("Could not list generated files: {}", e),
    }

    Ok(())
}

fn print_statistics(stats: &PipelineStatistics) {
    println!("📊 Pipeline statistics:");
    println!("   Columns:            {}", stats.total_columns);
    println!("   Records before:     {}", stats.before_count);
    println!("   Records after:      {}", stats.after_count);
    println!("   Removed (reported): {}", stats.removed);
    // The reported removal count is authoritative; the derived drop is shown
    // beside it and may legitimately differ.
    println!(
        "   Dropped (derived):  {}",
        stats.before_count - stats.after_count
    );
    println!(
        "   Deduplication:      {} -> {} ({} removed)",
        stats.dedup_before, stats.dedup_after, stats.dedup_removed
    );

    if !stats.pipeline_steps.is_empty() {
        println!("   Steps:");
        for step in &stats.pipeline_steps {
            match &step.description {
                Some(description) => {
                    println!("     {}: {} records ({})", step.step, step.records, description)
                }
                None => println!("     {}: {} records", step.step, step.records),
            }
        }
    }

    if let Some(npi) = &stats.npi_validation {
        println!(
            "   NPI validation:     {}/{} valid ({:.2}%)",
            npi.valid_count, npi.total_count, npi.valid_percentage
        );
    }
}
