use std::env;
use std::path::PathBuf;

use rand::Rng;
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub secret_key: String,
    pub smtp: Option<SmtpConfig>,
    pub persist_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let secret_key = match env::var("SECRET_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("SECRET_KEY not set; generated an ephemeral session secret");
                random_secret()
            }
        };

        Self {
            secret_key,
            smtp: SmtpConfig::from_env(),
            persist_path: env::var("PERSIST_PATH").ok().map(PathBuf::from),
        }
    }
}

impl SmtpConfig {
    fn from_env() -> Option<Self> {
        let vars = ["SMTP_SERVER", "SMTP_PORT", "SMTP_USERNAME", "SMTP_PASSWORD"];
        let set = vars.iter().filter(|v| env::var(v).is_ok()).count();
        if set == 0 {
            return None;
        }
        if set < vars.len() {
            warn!("incomplete smtp configuration; notifications disabled");
            return None;
        }

        let port = match env::var("SMTP_PORT").ok()?.parse() {
            Ok(port) => port,
            Err(_) => {
                warn!("SMTP_PORT is not a port number; notifications disabled");
                return None;
            }
        };

        Some(Self {
            server: env::var("SMTP_SERVER").ok()?,
            port,
            username: env::var("SMTP_USERNAME").ok()?,
            password: env::var("SMTP_PASSWORD").ok()?,
        })
    }
}

fn random_secret() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secret_is_hex() {
        let secret = random_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
