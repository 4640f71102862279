//! `helm lint`

use drover_core::ResolvedConfig;

use crate::command::{HelmCommand, StepContext, push_flag};
use crate::error::{KubeError, Result};

#[derive(Debug)]
pub struct Lint {
    chart: String,
    values: String,
    string_values: String,
    values_files: Vec<String>,
    strict: bool,
    command: Option<HelmCommand>,
}

impl Lint {
    pub fn new(cfg: &ResolvedConfig) -> Self {
        Self {
            chart: cfg.chart.clone(),
            values: cfg.values.clone(),
            string_values: cfg.string_values.clone(),
            values_files: cfg.values_files.clone(),
            strict: cfg.lint_strictly,
            command: None,
        }
    }

    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        if self.chart.is_empty() {
            return Err(KubeError::required("chart"));
        }

        let mut args = ctx.global_flags();
        args.push("lint".to_string());
        if !self.values.is_empty() {
            push_flag(&mut args, "--set", &self.values);
        }
        if !self.string_values.is_empty() {
            push_flag(&mut args, "--set-string", &self.string_values);
        }
        for file in &self.values_files {
            push_flag(&mut args, "--values", file);
        }
        if self.strict {
            args.push("--strict".to_string());
        }
        args.push(self.chart.clone());

        self.command = Some(ctx.command(args));
        Ok(())
    }

    pub fn command(&self) -> Option<&HelmCommand> {
        self.command.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::test_support::context;

    #[test]
    fn test_lint_flags() {
        let mut step = Lint::new(&ResolvedConfig {
            chart: "./flow".to_string(),
            values: "steadfastness,forthrightness".to_string(),
            string_values: "tensile_strength,flexibility".to_string(),
            values_files: vec!["/root/price_inventory.yml".to_string()],
            lint_strictly: true,
            ..Default::default()
        });
        step.prepare(&context()).unwrap();
        assert_eq!(
            step.command().unwrap().args(),
            [
                "lint",
                "--set",
                "steadfastness,forthrightness",
                "--set-string",
                "tensile_strength,flexibility",
                "--values",
                "/root/price_inventory.yml",
                "--strict",
                "./flow",
            ]
        );
    }

    #[test]
    fn test_namespace_precedes_lint() {
        let ctx = StepContext {
            namespace: "table_service".to_string(),
            ..context()
        };
        let mut step = Lint::new(&ResolvedConfig {
            chart: "./flow".to_string(),
            ..Default::default()
        });
        step.prepare(&ctx).unwrap();
        assert_eq!(
            step.command().unwrap().args(),
            ["--namespace", "table_service", "lint", "./flow"]
        );
    }

    #[test]
    fn test_chart_required() {
        let mut step = Lint::new(&ResolvedConfig::default());
        assert!(matches!(
            step.prepare(&context()),
            Err(KubeError::MissingRequired { field: "chart" })
        ));
    }
}
