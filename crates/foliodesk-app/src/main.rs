// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Foliodesk — Local Document Desk
//
// Entry point. Initialises logging, backend services, and dispatches the
// parsed command.

mod cli;
mod services;

use std::process::ExitCode;

use clap::Parser;
use foliodesk_core::error::Result;
use foliodesk_core::{Bucket, Metadata, TaskRequest};

use cli::{Cli, Command};
use services::app_services::AppServices;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let services = match cli.data_dir {
        Some(dir) => AppServices::init_at(dir)?,
        None => AppServices::init()?,
    };

    match cli.command {
        Command::Upload { file } => {
            let document = services.upload(&file)?;
            println!(
                "{} -> {}/{}",
                document.filename,
                document.bucket,
                document.filename
            );
        }

        Command::List { bucket } => match bucket {
            Some(name) => {
                let bucket = parse_bucket(&name)?;
                for filename in services.list(bucket)? {
                    println!("{filename}");
                }
            }
            None => {
                for bucket in Bucket::ALL {
                    for filename in services.list(bucket)? {
                        println!("{bucket}/{filename}");
                    }
                }
            }
        },

        Command::Outputs => {
            for name in services.list_output()? {
                println!("{name}");
            }
        }

        Command::Info { filename } => {
            if let Some(name) = &filename {
                services.serve(name)?;
            }
            print_metadata(&services.current_info()?);
        }

        Command::Serve { filename } => {
            let path = services.serve(&filename)?;
            println!("{}", path.display());
        }

        Command::Process {
            task,
            filename,
            set_name,
            password,
        } => {
            let request = TaskRequest::from_form(&task, &filename, &set_name, &password)?;
            report_outcome(&services.process(request)?);
        }

        Command::Unlock {
            filename,
            password,
            set_name,
        } => {
            let request = TaskRequest::Unlock {
                filename,
                password,
                output_name: set_name,
            };
            report_outcome(&services.process(request)?);
        }

        Command::Compose {
            heading,
            message,
            set_name,
        } => {
            let request = TaskRequest::Compose {
                heading,
                message,
                set_name,
            };
            report_outcome(&services.process(request)?);
        }
    }

    Ok(())
}

fn parse_bucket(name: &str) -> Result<Bucket> {
    Bucket::parse(name)
        .ok_or_else(|| foliodesk_core::FoliodeskError::UnknownBucket(name.to_string()))
}

fn print_metadata(metadata: &Metadata) {
    for (key, value) in metadata.iter() {
        match value {
            Some(value) => println!("{key}: {value}"),
            None => println!("{key}"),
        }
    }
}

fn report_outcome(outcome: &foliodesk_core::TaskOutcome) {
    for artifact in &outcome.artifacts {
        println!("{}", artifact.display());
    }
    print_metadata(&outcome.metadata);
}
