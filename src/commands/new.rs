use clap::Args;
use serde::Serialize;

use skeleton::defaults;
use skeleton::local_files;
use skeleton::paths;
use skeleton::ItemStatus;
use skeleton::scaffold::{self, ScaffoldItem, ScaffoldReport, ScaffoldRequest};

use super::CmdResult;
use crate::output;

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Component folder (default: parent of the skeleton install directory)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<String>,

    /// Generate new skeleton for component
    #[arg(short = 'n', long = "new")]
    pub new: bool,

    /// Print the result as a JSON envelope
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOutput {
    pub command: &'static str,
    #[serde(flatten)]
    pub report: ScaffoldReport,
}

/// Run the scaffold. In text mode each skipped target is printed as it is
/// met, so the notices survive a later failure.
pub fn run(args: &NewArgs) -> CmdResult<NewOutput> {
    let config = defaults::load_config();
    let skeleton_dir = paths::install_root(
        config.skeleton_dir.as_deref(),
        &config.defaults.support_files,
    )?;

    let mut print_result = Ok(());
    let report = scaffold::scaffold_with(
        &local_files::local(),
        &ScaffoldRequest {
            component_dir: args.dir.as_deref(),
            skeleton_dir: &skeleton_dir,
            defaults: &config.defaults,
        },
        |item| {
            if args.json || print_result.is_err() {
                return;
            }
            if let Some(line) = skipped_line(item) {
                print_result = output::print_lines([line]);
            }
        },
    )?;
    print_result?;

    Ok((
        NewOutput {
            command: "new",
            report,
        },
        0,
    ))
}

/// Plain-text notice for a target that was left alone.
pub fn skipped_line(item: &ScaffoldItem) -> Option<String> {
    match item.status {
        ItemStatus::Skipped => Some(format!("{} already exists", item.path)),
        ItemStatus::Created => None,
    }
}
