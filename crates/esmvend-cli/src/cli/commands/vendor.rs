//! `esmvend vendor`: merge flags with the job file, then run the driver.

use anyhow::Result;
use esmvend_core::config::{self, EntryUrls, JobFile, VendorConfig};
use esmvend_core::driver;
use esmvend_core::error::VendorError;
use esmvend_core::fetch::CurlFetcher;
use std::sync::Arc;

use crate::cli::VendorArgs;

/// Job described by the flags alone, overlaid on the `--config` file if given.
pub fn job_from_args(args: &VendorArgs) -> Result<JobFile> {
    let flags = JobFile {
        url: (!args.urls.is_empty()).then(|| EntryUrls::Many(args.urls.clone())),
        output: args.output.clone(),
        import_name: args.import_name.clone(),
    };
    Ok(match &args.config {
        Some(path) => flags.overlay(config::load_job_file(path)?),
        None => flags,
    })
}

pub async fn run_vendor(cfg: &VendorConfig, args: VendorArgs) -> Result<()> {
    let mut opts = job_from_args(&args)?.into_options(cfg)?;
    if let Some(jobs) = args.jobs {
        opts.max_concurrent_loads = jobs.max(1);
    }

    let fetcher = Arc::new(CurlFetcher::new(cfg.fetch_config()));
    match driver::vendor(&opts, fetcher).await {
        Ok(report) => {
            println!(
                "vendored {} module(s) into {}",
                report.modules,
                opts.output_dir.display()
            );
            println!("import map: {}", report.import_map_path.display());
            Ok(())
        }
        Err(VendorError::Bundle { diagnostics }) => {
            for d in &diagnostics {
                eprintln!("error: {d}");
            }
            Err(VendorError::Bundle { diagnostics }.into())
        }
        Err(e) => Err(e.into()),
    }
}
