//! Configuration for the manifest server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tams_hls_lib::catalog::auth::{ClientCredentials, TokenProvider};
use tams_hls_lib::{PathSigner, SecureLinkSigner, UrlSigner};

/// TAMS HLS manifest server configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "tams-hls-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to bind the manifest server to.
    #[arg(short = 'b', long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// TAMS store base URL.
    #[arg(short = 't', long, default_value = "http://127.0.0.1:4010")]
    pub tams_url: String,

    /// Static bearer token for the TAMS store.
    #[arg(long)]
    pub token: Option<String>,

    /// OAuth2 token endpoint for client-credentials auth.
    #[arg(long)]
    pub token_url: Option<String>,

    /// OAuth2 client id.
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth2 client secret.
    #[arg(long)]
    pub client_secret: Option<String>,

    /// OAuth2 scopes requested with the client-credentials grant.
    #[arg(long, value_delimiter = ',', default_value = "tams-api/read")]
    pub scopes: Vec<String>,

    /// Default number of segments in a media playlist when a flow carries
    /// no `hls_segments` tag.
    #[arg(long, default_value_t = 150)]
    pub default_segments: u64,

    /// Codec mapping table location (JSON file path or http(s) URL).
    #[arg(long)]
    pub codec_map: Option<String>,

    /// Seconds before the cached codec mapping table is refreshed.
    #[arg(long, default_value_t = 300)]
    pub codec_map_ttl: u64,

    /// Shared secret for signed playlist URLs.
    #[arg(long)]
    pub sign_secret: Option<String>,

    /// Public base URL embedded in signed playlist URLs.
    #[arg(long)]
    pub public_url: Option<String>,

    /// Seconds a signed URL stays valid.
    #[arg(long, default_value_t = 60)]
    pub sign_ttl: u64,

    /// Catalog request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Logging level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.tams_url.starts_with("http://") && !self.tams_url.starts_with("https://") {
            return Err("TAMS URL must start with http:// or https://".to_string());
        }

        if self.sign_secret.is_some() != self.public_url.is_some() {
            return Err(
                "Both --sign-secret and --public-url must be provided together".to_string(),
            );
        }

        let credential_parts = [&self.token_url, &self.client_id, &self.client_secret];
        let provided = credential_parts.iter().filter(|p| p.is_some()).count();
        if provided != 0 && provided != credential_parts.len() {
            return Err(
                "--token-url, --client-id and --client-secret must be provided together"
                    .to_string(),
            );
        }

        if self.token.is_some() && provided != 0 {
            return Err("--token conflicts with client-credentials options".to_string());
        }

        Ok(())
    }

    /// Credential source for catalog requests.
    pub fn token_provider(&self, http: reqwest::Client) -> TokenProvider {
        if let Some(token) = &self.token {
            return TokenProvider::Static(token.clone());
        }
        if let (Some(token_url), Some(client_id), Some(client_secret)) =
            (&self.token_url, &self.client_id, &self.client_secret)
        {
            return TokenProvider::ClientCredentials(ClientCredentials::new(
                http,
                token_url.clone(),
                client_id.clone(),
                client_secret.clone(),
                self.scopes.clone(),
            ));
        }
        TokenProvider::None
    }

    /// URL signer for playlist entries.
    pub fn signer(&self) -> Arc<dyn UrlSigner> {
        match (&self.public_url, &self.sign_secret) {
            (Some(public_url), Some(secret)) => Arc::new(SecureLinkSigner::new(
                public_url.clone(),
                secret.clone(),
                Duration::from_secs(self.sign_ttl),
            )),
            _ => Arc::new(PathSigner),
        }
    }
}
