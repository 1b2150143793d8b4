//! Check command implementation

use crate::cli::output::{format_check_json, format_check_table, CheckView};
use crate::cli::CheckArgs;
use crate::config::GuardianConfig;
use crate::probe::{HealthCheckPort, HealthProbe, HttpHealthCheck};
use futures::future::join_all;
use std::sync::Arc;

/// Probe every configured node once. Nothing is recorded and no node is
/// restarted.
pub async fn probe_once(
    config: &GuardianConfig,
    port: Arc<dyn HealthCheckPort>,
) -> Vec<CheckView> {
    let probe = HealthProbe::new(port, config.guardian.probe_timeout());

    join_all(config.nodes.iter().map(|node| {
        let probe = probe.clone();
        async move {
            let result = probe.probe(&node.address).await;
            CheckView::new(&node.name, &node.address, &result)
        }
    }))
    .await
}

/// Handle `guardian check`. Returns the rendered output and whether every
/// node answered.
pub async fn handle_check(args: &CheckArgs) -> Result<(String, bool), Box<dyn std::error::Error>> {
    let config = GuardianConfig::load(Some(&args.config))?.with_env_overrides();
    config.validate()?;

    let port = Arc::new(HttpHealthCheck::new(config.guardian.health_path.clone())?);
    let checks = probe_once(&config, port).await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    let output = if args.json {
        format_check_json(&checks)?
    } else {
        format_check_table(&checks)
    };
    Ok((output, all_healthy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NodeConfig, NodeRole};
    use crate::probe::{ProbeError, ProbeOutcome};
    use async_trait::async_trait;
    use std::time::Duration;

    struct DownPort(&'static str);

    #[async_trait]
    impl HealthCheckPort for DownPort {
        async fn check(&self, address: &str, _timeout: Duration) -> ProbeOutcome {
            if address == self.0 {
                ProbeOutcome::failed(0, &ProbeError::ConnectionRefused(address.to_string()))
            } else {
                ProbeOutcome::reachable(3)
            }
        }
    }

    fn config() -> GuardianConfig {
        let mut config = GuardianConfig::default();
        config.nodes = ["a", "b", "c"]
            .iter()
            .map(|n| NodeConfig {
                name: n.to_string(),
                address: format!("http://{}:8080", n),
                role: NodeRole::Primary,
                unit: None,
            })
            .collect();
        config
    }

    #[tokio::test]
    async fn test_probe_once_keeps_config_order() {
        let checks = probe_once(&config(), Arc::new(DownPort("http://b:8080"))).await;
        let names: Vec<_> = checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(checks[0].healthy);
        assert!(!checks[1].healthy);
        assert!(checks[1].hard_failure);
    }

    #[tokio::test]
    async fn test_handle_check_missing_config_fails() {
        let args = CheckArgs {
            json: false,
            config: "/nonexistent/guardian.toml".into(),
        };
        assert!(handle_check(&args).await.is_err());
    }
}
