//! Kubernetes client construction

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;
use tracing::info;

use osluc_core::{OslucError, Result};

/// Where cluster credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterConfig {
    /// Service account mounted into the pod
    InCluster,
    Kubeconfig(PathBuf),
}

impl ClusterConfig {
    /// An empty path selects in-cluster credentials
    pub fn from_path(path: &str) -> Self {
        if path.is_empty() {
            Self::InCluster
        } else {
            Self::Kubeconfig(PathBuf::from(path))
        }
    }
}

/// Create a Kubernetes client
pub async fn create_client(cluster: &ClusterConfig) -> Result<Client> {
    let config = match cluster {
        ClusterConfig::Kubeconfig(path) => {
            info!(path = %path.display(), "Loading kubeconfig");
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                OslucError::config(format!(
                    "Unable to load kubeconfig from {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    OslucError::config(format!(
                        "Unable to load kubeconfig from {}: {}",
                        path.display(),
                        e
                    ))
                })?
        }
        ClusterConfig::InCluster => {
            info!("Using in-cluster credentials");
            Config::incluster().map_err(|e| {
                OslucError::config(format!("Unable to load in-cluster config: {}", e))
            })?
        }
    };

    Client::try_from(config)
        .map_err(|e| OslucError::config(format!("Unable to create a client: {}", e)))
}
