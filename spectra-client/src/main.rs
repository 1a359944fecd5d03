mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use spectra_client::domains::session::{
    ImageSelection, SessionController, SessionOptions,
};
use spectra_client::infra::api_types::HealthStatus;
use spectra_client::{ApiClient, ClientConfig};
use spectra_model::{EncodedImage, presets};

use crate::cli::{Cli, Command, ProcessArgs};

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("spectra_client", LevelFilter::Debug)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();

    let mut config = ClientConfig::load();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_process_timeout(timeout);
    }

    match cli.command {
        Command::Presets => {
            list_presets();
            Ok(())
        }
        Command::Health => health(&config).await,
        Command::Upload { file } => upload(&config, &file).await,
        Command::Process(args) => process(&config, args).await,
    }
}

fn list_presets() {
    for preset in presets() {
        println!("{:<18} {:<20} {}", preset.key, preset.label, preset.description);
    }
}

async fn health(config: &ClientConfig) -> Result<()> {
    let client = ApiClient::new(config)?;
    let status = client
        .health()
        .await
        .with_context(|| format!("{} is not reachable", client.base_url()))?;
    println!("{}", health_line(&status));
    if !status.is_ok() {
        bail!("service reports status '{}'", status.status);
    }
    Ok(())
}

fn health_line(status: &HealthStatus) -> String {
    match &status.message {
        Some(message) => format!("{}: {}", status.status, message),
        None => status.status.clone(),
    }
}

async fn upload(config: &ClientConfig, file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let filename = file_name(file);
    let client = ApiClient::new(config)?;
    let response = client.upload_image(bytes, &filename).await?;
    match response.filepath {
        Some(path) => println!("uploaded {} -> {}", response.filename, path),
        None => println!("uploaded {}", response.filename),
    }
    Ok(())
}

async fn process(config: &ClientConfig, args: ProcessArgs) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let selection = ImageSelection::from_bytes(&bytes, Some(file_name(&args.file)));

    let client = ApiClient::new(config)?;
    let mut controller = SessionController::with_options(
        Arc::new(client),
        SessionOptions {
            process_timeout: config.process_timeout(),
        },
    );

    if let Some(preset) = &args.preset {
        controller.apply_preset(preset)?;
    }
    controller.update_config(args.patch());
    controller.select_image(selection);
    controller
        .submit()
        .map_err(|rejection| anyhow!("cannot submit: {rejection}"))?;
    controller.run_until_idle().await;

    let view = controller.view();
    if let Some(error) = view.error {
        bail!("processing failed: {error}");
    }
    let metrics = view
        .metrics
        .ok_or_else(|| anyhow!("processing finished without a result"))?;

    let config = view.config;
    println!(
        "{} {} cutoff={} order={} (preset: {})",
        config.filter_type,
        config.filter_mode,
        config.cutoff,
        config.order,
        view.active_preset
    );
    println!("MSE:  {:.4}", metrics.mse);
    println!("PSNR: {:.2} dB", metrics.psnr);
    println!("SSIM: {:.4}", metrics.ssim);

    if let Some(dir) = &args.out {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let outputs = [
            ("processed", view.processed_image),
            ("spectrum", view.magnitude_spectrum),
            ("mask", view.filter_mask),
        ];
        for (stem, image) in outputs {
            if let Some(image) = image {
                let path = write_image(dir, stem, image).await?;
                println!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}

async fn write_image(
    dir: &Path,
    stem: &str,
    image: &EncodedImage,
) -> Result<std::path::PathBuf> {
    let extension = extension_for(image.mime_type());
    let path = dir.join(format!("{stem}.{extension}"));
    let bytes = image
        .decode()
        .with_context(|| format!("{stem} image is not decodable"))?;
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn extension_for(mime: Option<&str>) -> &'static str {
    match mime {
        Some("image/png") | None => "png",
        Some("image/jpeg") => "jpg",
        Some("image/bmp") => "bmp",
        Some("image/tiff") => "tiff",
        Some("image/webp") => "webp",
        Some(_) => "bin",
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_line_includes_message_when_present() {
        let status = HealthStatus {
            status: "ok".into(),
            message: Some("Fourier service up".into()),
        };
        assert_eq!(health_line(&status), "ok: Fourier service up");
        assert!(status.is_ok());

        let degraded = HealthStatus {
            status: "degraded".into(),
            message: None,
        };
        assert_eq!(health_line(&degraded), "degraded");
        assert!(!degraded.is_ok());
    }

    #[test]
    fn output_extension_follows_mime_type() {
        assert_eq!(extension_for(Some("image/jpeg")), "jpg");
        assert_eq!(extension_for(None), "png");
        assert_eq!(extension_for(Some("text/plain")), "bin");
    }
}
