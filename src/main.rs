use photogen::logger::{self, LoggerConfig};
use photogen::{Config, GenerationOptions, InferenceClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init_with_config(LoggerConfig::development())?;

    match dotenv::dotenv() {
        Ok(_) => log::info!(".env file loaded"),
        Err(_) => log::warn!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    config.validate()?;

    let client = InferenceClient::new(config)?;

    let intent = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a lighthouse on a rocky cliff at golden hour".to_string());
    log::info!("Intent: {}", intent);

    let creation = client.create_image(&intent, GenerationOptions::new()).await?;
    log::info!("{}", creation.label());

    let filename = format!(
        "photogen_{}_{}.png",
        creation.model.replace(['.', '/', ':'], "_"),
        chrono::Utc::now().timestamp()
    );
    creation.image.save(&filename)?;
    log::info!("Image saved to: {}", filename);

    Ok(())
}
