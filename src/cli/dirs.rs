use std::path::Path;

use tracing::info;

use crate::classifier::{BaselineMode, StatusRange, SuccessPredicate};
use crate::cli::commands::DirsArgs;
use crate::cli::common::{self, GlobalOptions, ScanDefaults};
use crate::errors::ProbeKitError;
use crate::generator::{cap_from_limit, load_axis_soft, CandidatePlan, CandidateShape, RequestTemplate};

/// Status codes that count as an existing path.
pub const ACTIVE_PATH_STATUS: StatusRange = StatusRange::new(200, 400);

pub async fn handle_dirs(args: DirsArgs, global: &GlobalOptions) -> Result<(), ProbeKitError> {
    let file_config = common::load_file_config(global).await?;
    let base = common::parse_target(&args.url)?;

    let resolved = common::resolve(
        &args.common,
        &file_config,
        ScanDefaults {
            prefix: "dirfuzz".into(),
            baseline: BaselineMode::Off,
            predicate: SuccessPredicate {
                accept_status: Some(ACTIVE_PATH_STATUS),
                ..Default::default()
            },
        },
    )?;

    let plan = CandidatePlan::from_loaded(
        CandidateShape::Path,
        vec![load_axis_soft("paths", Path::new(&args.wordlist), cap_from_limit(args.max)).await],
    )?;

    info!(base = %base, paths = plan.set.len(), "Directory scan prepared");
    common::execute(global, resolved, RequestTemplate::Path { base }, plan).await?;
    Ok(())
}
