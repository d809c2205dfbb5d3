use log::info;

use super::Context;
use crate::error::AppError;
use crate::settings::{SettingKey, parse_flag};
use crate::storage::ConfigError;

/// Attributes stored on an environment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvironmentAttribute {
    GlobalBin,
    CompileSteps,
}

impl EnvironmentAttribute {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "globalbin" => Some(Self::GlobalBin),
            "compilesteps" => Some(Self::CompileSteps),
            _ => None,
        }
    }
}

fn split_steps(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// `attribute value` changes a setting; `attribute@environment value`
/// changes an environment.
pub fn run(ctx: &mut Context, attribute: &str, value: &str) -> Result<(), AppError> {
    if let Some((attribute, environment)) = attribute.split_once('@') {
        let key = EnvironmentAttribute::parse(attribute).ok_or_else(|| {
            AppError::usage(format!(
                "unknown environment attribute {attribute:?} (expected globalbin or compilesteps)"
            ))
        })?;
        let environments = ctx.environments();
        let mut record = environments.get(environment)?;
        match key {
            EnvironmentAttribute::GlobalBin => record.global_bin = parse_flag(value),
            EnvironmentAttribute::CompileSteps => record.compile_steps = split_steps(value),
        }
        environments.save(&record)?;
        info!("Set {attribute} on {environment}");
        return Ok(());
    }

    let key = SettingKey::parse(attribute).ok_or_else(|| {
        AppError::usage(format!(
            "unknown setting {attribute:?} (expected bootstrap, default, mirror or debug)"
        ))
    })?;
    let name = value.trim();
    if key == SettingKey::Default && !name.is_empty() && !ctx.environments().exists(name) {
        return Err(ConfigError::NotFound(name.to_string()).into());
    }
    ctx.settings.set(key, value);
    ctx.settings.save(&ctx.paths)?;
    info!("Set {attribute}");
    Ok(())
}
