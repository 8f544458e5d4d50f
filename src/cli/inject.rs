use std::path::PathBuf;

use tracing::info;
use url::Url;

use crate::classifier::{BaselineMode, InjectionKind};
use crate::cli::commands::InjectArgs;
use crate::cli::common::{self, GlobalOptions, ScanDefaults};
use crate::errors::ProbeKitError;
use crate::generator::{
    cap_from_limit, load_axis_soft, query_parameters, Axis, CandidatePlan, CandidateShape,
    LoadedAxis, RequestTemplate,
};

pub async fn handle_inject(args: InjectArgs, global: &GlobalOptions) -> Result<(), ProbeKitError> {
    let file_config = common::load_file_config(global).await?;
    let target = common::parse_target(&args.url)?;
    let kind: InjectionKind = args.kind.parse()?;
    let parameters = select_parameters(&target, args.params.as_deref())?;

    let resolved = common::resolve(
        &args.common,
        &file_config,
        ScanDefaults {
            prefix: format!("{}_scan", kind),
            baseline: BaselineMode::Off,
            predicate: kind.predicate(),
        },
    )?;

    let payload_path = args
        .payloads
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_payload_path(kind));

    let plan = CandidatePlan::from_loaded(
        CandidateShape::Payload,
        vec![
            LoadedAxis { axis: Axis::new("parameters", parameters.clone()), error: None },
            load_axis_soft("payloads", &payload_path, cap_from_limit(args.max_payloads)).await,
        ],
    )?;

    info!(
        target = %target,
        kind = %kind,
        parameters = ?parameters,
        requests = plan.set.len(),
        "Injection scan prepared"
    );
    common::execute(global, resolved, RequestTemplate::Payload { target }, plan).await?;
    Ok(())
}

pub fn default_payload_path(kind: InjectionKind) -> PathBuf {
    let name = match kind {
        InjectionKind::Sqli => "SQLi",
        InjectionKind::Xss => "XSS",
        InjectionKind::Lfi => "LFI",
    };
    PathBuf::from(format!("wordlist/{}-wordlist.txt", name))
}

/// Explicit `--params` list, or every query parameter of the target.
pub fn select_parameters(target: &Url, explicit: Option<&str>) -> Result<Vec<String>, ProbeKitError> {
    let parameters: Vec<String> = match explicit {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        None => query_parameters(target),
    };
    if parameters.is_empty() {
        return Err(ProbeKitError::Config(
            "No parameters to test: pass --params or include a query string in --url".into(),
        ));
    }
    Ok(parameters)
}
