//! Stress command implementation
//!
//! Runs a position through pool-wide loss severities.

use tracing::info;
use tranche_risk::scenarios::{StressReport, StressRunner, StressSeverity};

use super::{money, pct, render, render_table};
use crate::config::CliConfig;
use crate::Result;

/// Run the stress command
pub fn run(
    config: &CliConfig,
    amount: f64,
    min: i64,
    max: i64,
    tvl: f64,
    severities: &[StressSeverity],
) -> Result<()> {
    print!("{}", render_stress(config, amount, min, max, tvl, severities)?);
    Ok(())
}

/// Build the stress command output
///
/// An empty `severities` slice uses the configured defaults.
pub fn render_stress(
    config: &CliConfig,
    amount: f64,
    min: i64,
    max: i64,
    tvl: f64,
    severities: &[StressSeverity],
) -> Result<String> {
    let runner = StressRunner::new(&config.engine)?;
    let report = if severities.is_empty() {
        runner.stress_scenarios(amount, (min, max), tvl)?
    } else {
        runner.run_presets(amount, (min, max), tvl, severities)?
    };

    if let Some(worst) = report.worst_case() {
        info!(
            "Worst case for {} position: {} loses {}",
            report.position_tier,
            worst.label,
            money(worst.dollar_loss)
        );
    }

    render(config.format, &report, table)
}

fn table(report: &StressReport) -> String {
    let rows: Vec<Vec<String>> = report
        .outcomes
        .iter()
        .map(|o| {
            vec![
                o.label.clone(),
                o.scenario.clone(),
                format!("{:.2}%", o.loss_percent),
                money(o.dollar_loss),
                money(o.pool_unabsorbed),
            ]
        })
        .collect();

    let mut out = format!(
        "Position {} over {} ({} tier), pool TVL {}\n",
        money(report.amount),
        report.range,
        report.position_tier,
        money(report.total_tvl)
    );
    out.push_str(&render_table(
        &["Severity", "Scenario", "Loss", "Dollar loss", "Pool unabsorbed"],
        &rows,
    ));
    if let Some(worst) = report.worst_case() {
        out.push_str(&format!(
            "Worst case: {} ({} of position)\n",
            worst.label,
            pct(worst.loss_percent / 100.0)
        ));
        out.push_str(&format!(
            "  {}\n",
            StressSeverity::from_value(worst.severity).description()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_stress_defaults_table() {
        let out = render_stress(&CliConfig::default(), 10_000.0, 30, 59, 1_000_000.0, &[]).unwrap();
        assert!(out.contains("Junior tier"));
        assert!(out.contains("│ 5% "));
        assert!(out.contains("4000.00"));
        assert!(out.contains("Worst case: 20%"));
        assert!(out.contains("Extreme"));
        assert!(out.contains("Systemic failure"));
    }

    #[test]
    fn test_stress_explicit_severities_json() {
        let config = CliConfig {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let severities = [StressSeverity::Severe, StressSeverity::Mild];
        let out = render_stress(&config, 1_000.0, 60, 99, 1_000_000.0, &severities).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["label"], "1%");
        assert_eq!(outcomes[0]["scenario"], "Mild");
        assert_eq!(value["position_tier"], "equity");
    }

    #[test]
    fn test_stress_rejects_bad_severity() {
        let severities = [StressSeverity::Custom(1.5)];
        assert!(render_stress(&CliConfig::default(), 1.0, 0, 9, 100.0, &severities).is_err());
    }
}
