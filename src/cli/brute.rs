use std::path::Path;

use tracing::{info, warn};

use crate::classifier::{BaselineMode, SuccessPredicate};
use crate::cli::commands::BruteArgs;
use crate::cli::common::{self, GlobalOptions, ScanDefaults};
use crate::errors::ProbeKitError;
use crate::generator::{cap_from_limit, load_axis_soft, CandidatePlan, CandidateShape, RequestTemplate};
use crate::transport::HttpMethod;

pub async fn handle_brute(args: BruteArgs, global: &GlobalOptions) -> Result<(), ProbeKitError> {
    let file_config = common::load_file_config(global).await?;
    let target = common::parse_target(&args.url)?;
    let method: HttpMethod = args.method.parse()?;
    let extra_fields = parse_extra_data(args.extra_data.as_deref())?;

    let resolved = common::resolve(
        &args.common,
        &file_config,
        ScanDefaults {
            prefix: "bruteforce".into(),
            baseline: BaselineMode::Auto,
            predicate: SuccessPredicate::default(),
        },
    )?;

    let predicate = &resolved.scan.predicate;
    if !predicate.has_keywords() && !predicate.allow_redirect && !resolved.scan.baseline.captures_for(predicate) {
        warn!("No success heuristics enabled; every attempt will be a miss");
    }

    let template = RequestTemplate::Credential {
        target: target.clone(),
        method,
        user_field: args.user_field.clone(),
        pass_field: args.pass_field.clone(),
        extra_fields,
    };
    let plan = CandidatePlan::from_loaded(
        CandidateShape::Credential,
        vec![
            load_axis_soft("usernames", Path::new(&args.userlist), cap_from_limit(args.max_users)).await,
            load_axis_soft("passwords", Path::new(&args.passlist), cap_from_limit(args.max_pass)).await,
        ],
    )?;

    info!(target = %target, method = %method, combinations = plan.set.len(), "Credential scan prepared");
    common::execute(global, resolved, template, plan).await?;
    Ok(())
}

/// Extra form fields from a JSON object. Non-string values are sent in their JSON form.
pub fn parse_extra_data(raw: Option<&str>) -> Result<Vec<(String, String)>, ProbeKitError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };

    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ProbeKitError::Config(format!("Invalid --extra-data JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| ProbeKitError::Config("--extra-data must be a JSON object".into()))?;

    Ok(object
        .iter()
        .map(|(k, v)| {
            let value = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect())
}
