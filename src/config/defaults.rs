//! Default configuration values

use super::schema::Config;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert!(!config.include_system);
        assert!(config.output.pretty);
        assert!(config.output.include_raw);
        assert_eq!(
            config.system_namespaces,
            vec!["kube-system", "kube-public", "kube-node-lease"]
        );
        assert_eq!(config.hidden_prefixes, vec!["system:", "kubeadm:", "calico-"]);
    }
}
