use crate::MemoryDriver;
use tabula_core::{Context, Driver, Error, Result, truncate_long};
use url::Url;

/// Settings of an in-memory database, read from its connection URL.
///
/// `memory://<name>?sequence_start=<n>`, every parameter is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Label used in log messages.
    pub name: String,
    /// First value handed out by auto increment columns of newly created tables.
    pub sequence_start: i64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            name: "default".into(),
            sequence_start: 1,
        }
    }
}

impl MemoryConfig {
    pub fn from_url(url: &str) -> Result<Self> {
        let context = || format!("While parsing the connection URL `{}`", truncate_long(url));
        let prefix = format!("{}://", MemoryDriver::NAME);
        if !url.starts_with(&prefix) {
            let error = Error::msg(format!(
                "Memory connection url must start with `{}`",
                &prefix
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let url = Url::parse(url).with_context(context)?;
        let mut config = MemoryConfig::default();
        if let Some(name) = url.host_str()
            && !name.is_empty()
        {
            config.name = name.into();
        }
        for (key, value) in url.query_pairs() {
            match &*key {
                "sequence_start" => {
                    config.sequence_start = value.parse().with_context(|| {
                        format!("Parameter `sequence_start` must be an integer, got `{}`", value)
                    })?;
                }
                _ => {
                    let error =
                        Error::msg(format!("Unknown parameter `{}`", key)).context(context());
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryConfig;

    #[test]
    fn defaults() {
        assert_eq!(
            MemoryConfig::from_url("memory://").unwrap(),
            MemoryConfig::default()
        );
    }

    #[test]
    fn name_and_sequence() {
        let config = MemoryConfig::from_url("memory://shop?sequence_start=100").unwrap();
        assert_eq!(config.name, "shop");
        assert_eq!(config.sequence_start, 100);
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(MemoryConfig::from_url("sqlite://shop").is_err());
        assert!(MemoryConfig::from_url("memory://shop?cache=shared").is_err());
        assert!(MemoryConfig::from_url("memory://shop?sequence_start=ten").is_err());
    }
}
