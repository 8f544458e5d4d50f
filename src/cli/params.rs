use std::path::Path;

use tracing::info;

use crate::classifier::{BaselineMode, StatusRange, SuccessPredicate};
use crate::cli::commands::ParamsArgs;
use crate::cli::common::{self, GlobalOptions, ScanDefaults};
use crate::errors::ProbeKitError;
use crate::generator::{cap_from_limit, load_axis_soft, CandidatePlan, CandidateShape, RequestTemplate};

/// Any non-error status counts as the parameter being accepted.
pub const ACTIVE_PARAMETER_STATUS: StatusRange = StatusRange::new(100, 400);

pub async fn handle_params(args: ParamsArgs, global: &GlobalOptions) -> Result<(), ProbeKitError> {
    let file_config = common::load_file_config(global).await?;
    let target = common::parse_target(&args.url)?;

    let resolved = common::resolve(
        &args.common,
        &file_config,
        ScanDefaults {
            prefix: "param_scan".into(),
            baseline: BaselineMode::Off,
            predicate: SuccessPredicate {
                accept_status: Some(ACTIVE_PARAMETER_STATUS),
                ..Default::default()
            },
        },
    )?;

    let plan = CandidatePlan::from_loaded(
        CandidateShape::Parameter,
        vec![load_axis_soft("parameters", Path::new(&args.wordlist), cap_from_limit(args.max)).await],
    )?;

    info!(target = %target, parameters = plan.set.len(), "Parameter scan prepared");
    common::execute(global, resolved, RequestTemplate::Parameter { target }, plan).await?;
    Ok(())
}
