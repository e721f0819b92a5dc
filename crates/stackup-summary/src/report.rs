use std::io::{self, Write};

use serde::Serialize;
use stackup_config::Config;

use crate::address::DetectedAddress;
use crate::features::Features;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceUrl {
    pub name: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub name: &'static str,
    pub username: Option<String>,
    pub secret: String,
    /// Value came from the documented default, not the environment file.
    pub defaulted: bool,
}

/// Final report for a run that reached `Summarizing`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub domain: String,
    pub address: DetectedAddress,
    pub services: Vec<ServiceUrl>,
    pub credentials: Vec<Credential>,
    pub features: Features,
}

/// Value of `key` and whether it fell back to the documented default.
fn resolved(config: &Config, key: &str) -> (String, bool) {
    match config.get(key) {
        Some(value) => (value.to_string(), false),
        None => (config.get_or_default(key).unwrap_or_default().to_string(), true),
    }
}

fn credential(
    config: &Config,
    name: &'static str,
    user_key: Option<&str>,
    secret_key: &str,
) -> Credential {
    let user = user_key.map(|k| resolved(config, k));
    let (secret, secret_defaulted) = resolved(config, secret_key);
    Credential {
        name,
        defaulted: secret_defaulted || user.as_ref().is_some_and(|(_, d)| *d),
        username: user.map(|(u, _)| u),
        secret,
    }
}

impl SummaryReport {
    pub fn build(config: &Config, address: DetectedAddress, features: Features) -> Self {
        let domain = config.get("DOMAIN").unwrap_or("localhost").to_string();
        let services = vec![
            ServiceUrl {
                name: "Web application",
                url: format!("https://{domain}"),
            },
            ServiceUrl {
                name: "Identity (Keycloak)",
                url: format!("https://auth.{domain}"),
            },
            ServiceUrl {
                name: "LiveKit",
                url: format!("https://livekit.{domain}"),
            },
            ServiceUrl {
                name: "TURN",
                url: format!("turn:turn.{domain}:3478"),
            },
            ServiceUrl {
                name: "Grafana",
                url: format!("https://grafana.{domain}"),
            },
        ];
        let credentials = vec![
            credential(
                config,
                "Keycloak admin",
                Some("KEYCLOAK_ADMIN"),
                "KEYCLOAK_ADMIN_PASSWORD",
            ),
            credential(config, "TURN", Some("TURN_USERNAME"), "TURN_PASSWORD"),
            credential(config, "PostgreSQL", None, "POSTGRES_PASSWORD"),
        ];

        Self {
            domain,
            address,
            services,
            credentials,
            features,
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let rule = "=".repeat(60);
        writeln!(out)?;
        writeln!(out, "{rule}")?;
        writeln!(out, "  Platform deployment complete")?;
        writeln!(out, "{rule}")?;
        writeln!(out)?;

        match self.address {
            DetectedAddress::Known(addr) => {
                writeln!(out, "External address: {addr}")?;
                writeln!(
                    out,
                    "  Point DNS A records for {0} and *.{0} at {addr}",
                    self.domain
                )?;
            }
            DetectedAddress::Unknown => {
                writeln!(out, "External address: {}", self.address)?;
                writeln!(
                    out,
                    "  Look it up manually (curl https://api.ipify.org) and point DNS for {0} and *.{0} at it",
                    self.domain
                )?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Services:")?;
        let width = self.services.iter().map(|s| s.name.len()).max().unwrap_or(0);
        for service in &self.services {
            writeln!(out, "  {:<width$}  {}", service.name, service.url)?;
        }

        writeln!(out)?;
        writeln!(out, "Credentials:")?;
        let width = self.credentials.iter().map(|c| c.name.len()).max().unwrap_or(0);
        for cred in &self.credentials {
            let value = match &cred.username {
                Some(user) => format!("{user} / {}", cred.secret),
                None => cred.secret.clone(),
            };
            let note = if cred.defaulted {
                "  (default, change it)"
            } else {
                ""
            };
            writeln!(out, "  {:<width$}  {value}{note}", cred.name)?;
        }

        if self.features.gpu {
            writeln!(out)?;
            writeln!(out, "GPU: NVIDIA hardware detected; GPU workloads can be scheduled")?;
            writeln!(out, "  nvidia-smi")?;
        }
        if self.features.any_vpn() {
            writeln!(out)?;
            writeln!(out, "VPN mesh:")?;
            let status = |on: bool| if on { "yes" } else { "no" };
            writeln!(out, "  Control plane installed  {}", status(self.features.vpn_control_plane))?;
            writeln!(out, "  This node connected      {}", status(self.features.vpn_connected))?;
            writeln!(out, "  Service sidecars         {}", status(self.features.vpn_sidecar))?;
            writeln!(out, "  kubectl get pods -n headscale")?;
        }
        if self.features.remote_compute {
            writeln!(out)?;
            writeln!(out, "Remote compute: virtual-kubelet nodes registered")?;
            writeln!(out, "  kubectl get nodes -l type=virtual-kubelet")?;
        }

        writeln!(out)?;
        writeln!(out, "Useful commands:")?;
        writeln!(out, "  kubectl get pods -A")?;
        writeln!(out, "  kubectl get certificates -A")?;
        writeln!(out, "  kubectl logs -n <namespace> <pod>")?;
        writeln!(out, "  stackup --skip <phase>   re-run, bypassing completed phases")?;
        Ok(())
    }
}
