use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_folder: PathBuf,
    pub certificates_folder: PathBuf,
    pub assets_folder: PathBuf,
    /// Origin override for minted download URLs, for deployments behind a
    /// proxy. When unset the request's Host header is used.
    pub public_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let upload_folder = base_dir.join(
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()),
        );
        let certificates_folder = base_dir.join(
            std::env::var("CERTIFICATES_FOLDER").unwrap_or_else(|_| "certificates".to_string()),
        );
        let assets_folder = base_dir.join(
            std::env::var("ASSETS_FOLDER").unwrap_or_else(|_| "assets".to_string()),
        );

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3023".to_string())
            .parse()
            .unwrap_or(3023);
        let public_base_url = std::env::var("PUBLIC_BASE_URL").ok();

        Ok(Self {
            host,
            port,
            upload_folder,
            certificates_folder,
            assets_folder,
            public_base_url,
        })
    }
}
