use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Default address of a gateway backend running on the same machine.
pub const LOCAL_API_URL: &str = "http://localhost:3001";

/// Represents the gateway backends the console can talk to.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// Backend running on this machine.
    #[default]
    Local,
    /// Backend at user-supplied addresses.
    Custom {
        api_url: String,
        socket_url: Option<String>,
    },
}

impl Environment {
    /// Builds the environment from `OTP_GATEWAY_*` variables.
    ///
    /// `OTP_GATEWAY_API_URL` selects a custom backend; `OTP_GATEWAY_ENVIRONMENT=local`
    /// forces the local one even when a URL is set.
    pub fn from_env() -> Self {
        let selected = std::env::var("OTP_GATEWAY_ENVIRONMENT")
            .ok()
            .and_then(|s| s.parse::<Environment>().ok());
        let api_url = std::env::var("OTP_GATEWAY_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let socket_url = std::env::var("OTP_GATEWAY_SOCKET_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        match (selected, api_url) {
            (Some(Environment::Local), _) => Environment::Local,
            (_, Some(api_url)) => Environment::Custom {
                api_url,
                socket_url,
            },
            (_, None) => match socket_url {
                Some(socket_url) => Environment::Custom {
                    api_url: LOCAL_API_URL.to_string(),
                    socket_url: Some(socket_url),
                },
                None => Environment::Local,
            },
        }
    }

    /// Returns the REST base URL associated with the environment.
    pub fn api_url(&self) -> String {
        match self {
            Environment::Local => LOCAL_API_URL.to_string(),
            Environment::Custom { api_url, .. } => api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the push channel URL; falls back to the REST base URL.
    pub fn socket_url(&self) -> String {
        match self {
            Environment::Custom {
                socket_url: Some(url),
                ..
            } => url.trim_end_matches('/').to_string(),
            _ => self.api_url(),
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Environment::Custom {
                    api_url: s.to_string(),
                    socket_url: None,
                })
            }
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Custom { .. } => write!(f, "Custom"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Environment::{}, API: {}, Push: {}",
            self,
            self.api_url(),
            self.socket_url()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_and_urls() {
        assert_eq!("LOCAL".parse::<Environment>(), Ok(Environment::Local));
        assert_eq!(
            "https://otp.example.com".parse::<Environment>(),
            Ok(Environment::Custom {
                api_url: "https://otp.example.com".to_string(),
                socket_url: None
            })
        );
        assert!("beta".parse::<Environment>().is_err());
    }

    #[test]
    /// The push channel shares the REST host unless configured separately.
    fn socket_url_falls_back_to_api_url() {
        let env = Environment::Custom {
            api_url: "https://otp.example.com/".to_string(),
            socket_url: None,
        };
        assert_eq!(env.api_url(), "https://otp.example.com");
        assert_eq!(env.socket_url(), "https://otp.example.com");

        let env = Environment::Custom {
            api_url: "https://otp.example.com".to_string(),
            socket_url: Some("wss://push.example.com/".to_string()),
        };
        assert_eq!(env.socket_url(), "wss://push.example.com");
        assert_eq!(Environment::Local.socket_url(), LOCAL_API_URL);
    }
}
