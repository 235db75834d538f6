use serde::{Deserialize, Serialize};

/// `modules.tasks` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TasksConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_title_length: default_max_title_length(),
        }
    }
}

impl TasksConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            anyhow::bail!("tasks page sizes must be at least 1");
        }
        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "tasks.default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        if self.max_title_length == 0 {
            anyhow::bail!("tasks.max_title_length must be at least 1");
        }
        Ok(())
    }
}

fn default_page_size() -> u32 {
    5
}

fn default_max_page_size() -> u32 {
    100
}

fn default_max_title_length() -> usize {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TasksConfig::default();
        assert_eq!(cfg.default_page_size, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn inconsistent_sizes_are_rejected() {
        let cfg = TasksConfig {
            default_page_size: 50,
            max_page_size: 10,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
