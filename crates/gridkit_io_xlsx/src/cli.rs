//! Command-line surface of the `gridkit-xlsx` binary.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::conf::{N_WIDTH_UNIT_DIVISOR, derive_default_convert_options};
use crate::convert::{convert_json_file, convert_json_reader};
use crate::spec::{EnumRangeBorderPolicy, EnumSheetSelection, SpecConvertOptions, SpecXlsxReport};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RangeBorderPolicyArg {
    /// Paint the edges the border type selects by cell position.
    Positional,
    /// Paint all four edges of every cell whatever the border type.
    PaintAll,
}

impl From<RangeBorderPolicyArg> for EnumRangeBorderPolicy {
    fn from(value: RangeBorderPolicyArg) -> Self {
        match value {
            RangeBorderPolicyArg::Positional => Self::Positional,
            RangeBorderPolicyArg::PaintAll => Self::PaintAll,
        }
    }
}

/// Convert a Luckysheet-style JSON document into a styled XLSX workbook.
#[derive(Parser, Debug)]
#[command(name = "gridkit-xlsx", version, about)]
pub struct Args {
    /// Input JSON document (`-` reads stdin).
    input: PathBuf,

    /// Output workbook path.
    #[arg(short, long, default_value = "output.xlsx")]
    output: PathBuf,

    /// How range border declarations pick the edges they paint.
    #[arg(long, value_enum, default_value_t = RangeBorderPolicyArg::Positional)]
    range_border_policy: RangeBorderPolicyArg,

    /// Only convert the first sheet of the document.
    #[arg(long)]
    first_sheet_only: bool,

    /// Input column-width units per workbook width unit.
    #[arg(long, value_name = "F", default_value_t = N_WIDTH_UNIT_DIVISOR)]
    width_divisor: f64,

    /// Write cell values only, without formula text.
    #[arg(long)]
    no_formulas: bool,

    /// Increase log verbosity (`-v` info, `-vv` debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Conversion options selected by the flags.
    pub fn convert_options(&self) -> SpecConvertOptions {
        SpecConvertOptions {
            width_unit_divisor: self.width_divisor,
            range_border_policy: self.range_border_policy.into(),
            sheet_selection: if self.first_sheet_only {
                EnumSheetSelection::First
            } else {
                EnumSheetSelection::All
            },
            if_write_formulas: !self.no_formulas,
            ..derive_default_convert_options()
        }
    }
}

/// Parse the process arguments and run.
pub fn run() -> Result<()> {
    run_with_args(Args::parse())
}

/// Run one conversion with already parsed arguments.
pub fn run_with_args(args: Args) -> Result<()> {
    init_tracing(args.verbose);

    let options = args.convert_options();
    let report = convert_input(&args, &options)?;

    info!("{report}");
    for c_warning in &report.warnings {
        info!(warning = %c_warning, "conversion warning");
    }
    println!("Excel file has been generated: {}", args.output.display());
    Ok(())
}

fn convert_input(args: &Args, options: &SpecConvertOptions) -> Result<SpecXlsxReport> {
    if args.input.as_os_str() == "-" {
        return convert_json_reader(io::stdin().lock(), &args.output, options)
            .context("failed to convert document from stdin");
    }
    convert_json_file(&args.input, &args.output, options)
        .with_context(|| format!("failed to convert {}", args.input.display()))
}

fn init_tracing(verbose: u8) {
    let c_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(c_level));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        debug!("tracing subscriber already installed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["gridkit-xlsx", "in.json"]).expect("parse args");

        assert_eq!(args.output, PathBuf::from("output.xlsx"));
        assert_eq!(args.convert_options(), SpecConvertOptions::default());
    }

    #[test]
    fn test_args_flags_map_to_options() {
        let args = Args::try_parse_from([
            "gridkit-xlsx",
            "-",
            "-o",
            "out.xlsx",
            "--range-border-policy",
            "paint-all",
            "--first-sheet-only",
            "--width-divisor",
            "8",
            "--no-formulas",
            "-vv",
        ])
        .expect("parse args");

        let options = args.convert_options();
        assert_eq!(options.range_border_policy, EnumRangeBorderPolicy::PaintAll);
        assert_eq!(options.sheet_selection, EnumSheetSelection::First);
        assert_eq!(options.width_unit_divisor, 8.0);
        assert!(!options.if_write_formulas);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.input, PathBuf::from("-"));
    }

    #[test]
    fn test_run_with_args_writes_workbook() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_in = dir_tmp.path().join("in.json");
        let path_out = dir_tmp.path().join("out.xlsx");
        std::fs::write(&path_in, r#"[{"name": "S", "celldata": [{"r": 0, "c": 0, "v": {"v": 1}}]}]"#)
            .expect("write input");

        let args = Args::try_parse_from([
            "gridkit-xlsx".into(),
            path_in.clone().into_os_string(),
            "-o".into(),
            path_out.clone().into_os_string(),
        ])
        .expect("parse args");
        run_with_args(args).expect("run");

        assert!(path_out.exists());
    }
}
