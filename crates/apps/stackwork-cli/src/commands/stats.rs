//! Market statistics command.

use crate::config::CliConfig;
use crate::context::MarketContext;
use crate::error::CliResult;
use crate::output::{OutputFormat, Render, StatsOutput};

/// Execute the stats command.
pub fn stats(config: CliConfig, format: OutputFormat) -> CliResult<String> {
    let ctx = MarketContext::open(config)?;
    let stats = ctx.engine.platform_stats()?;
    Ok(StatsOutput { stats }.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::setup_config;
    use tempfile::TempDir;

    #[test]
    fn test_stats_empty_market() {
        let temp_dir = TempDir::new().unwrap();
        let output = stats(setup_config(&temp_dir), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["totalTasks"], 0);
        assert_eq!(value["tasksByStatus"]["open"], 0);
    }
}
