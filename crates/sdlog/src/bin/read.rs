// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! sdlog-read - Replay a container and print its typed records.
//!
//! Usage:
//!   sdlog-read --input students.mcap
//!   sdlog-read --input students.mcap --show-schemas

mod demo;

use clap::Parser;
use demo::DemoValue;
use sdlog::{DefinitionBundle, ReaderSession};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sdlog-read")]
#[command(about = "Replay a container and print its typed records")]
#[command(version)]
struct Args {
    /// Input container path
    #[arg(short, long)]
    input: PathBuf,

    /// Print the type definitions embedded in each schema
    #[arg(long)]
    show_schemas: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quiet mode (report only, no per-record output)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .init();

    let session = ReaderSession::open(&args.input)?;

    if args.show_schemas {
        print_embedded_schemas(&session)?;
    }

    let decoders = demo::decoder_registry();
    let report = session.dispatch(&decoders)?;

    let mut students = 0usize;
    let mut points = 0usize;
    for decoded in &report.decoded {
        match &decoded.value {
            DemoValue::Student(student) => {
                students += 1;
                if !args.quiet {
                    println!("Student #{}:", students);
                    println!("  ID    : {}", student.id);
                    println!("  Name  : {}", student.name);
                    println!("  Age   : {}", student.age);
                    println!("  Email : {}", student.email);
                    println!("  Score : {}", student.score);
                    println!();
                }
            }
            DemoValue::Point3(point) => {
                points += 1;
                if !args.quiet {
                    println!(
                        "Point3 #{}: x={:.3} y={:.3} z={:.3}",
                        points, point.x, point.y, point.z
                    );
                }
            }
        }
    }

    println!(
        "Total: {} record(s) decoded ({} Student, {} Point3), {} skipped.",
        report.decoded_count(),
        students,
        points,
        report.skipped_count()
    );

    Ok(())
}

/// Decode and print the definition closure attached to each schema.
fn print_embedded_schemas(session: &ReaderSession) -> anyhow::Result<()> {
    let mut schemas: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for message in session.records()? {
        let message = message?;
        if let Some(schema) = message.channel.schema.as_ref() {
            schemas
                .entry(schema.name.clone())
                .or_insert_with(|| schema.data.to_vec());
        }
    }

    for (name, data) in &schemas {
        match DefinitionBundle::decode(data) {
            Ok(bundle) => {
                println!("Schema '{}': {} definition group(s)", name, bundle.groups.len());
                for group in &bundle.groups {
                    let types: Vec<&str> =
                        group.types.iter().map(|t| t.name.as_str()).collect();
                    println!("  {} -> [{}]", group.name, types.join(", "));
                }
            }
            Err(e) => info!("Schema '{}' carries an opaque bundle: {}", name, e),
        }
    }
    println!();

    Ok(())
}
