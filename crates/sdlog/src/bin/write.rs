// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! sdlog-write - Write a demo container of typed records.
//!
//! Usage:
//!   sdlog-write --output students.mcap
//!   sdlog-write --output students.mcap --count 100

mod demo;

use clap::Parser;
use demo::{Point3, Student};
use sdlog::{build_closure, now_nanos, LogMessage, SessionMetadata, WriterSession, ENCODING};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "sdlog-write")]
#[command(about = "Write a demo container of typed records")]
#[command(version)]
struct Args {
    /// Output container path
    #[arg(short, long, default_value = "students.mcap")]
    output: PathBuf,

    /// Records to write per channel
    #[arg(short, long, default_value = "10")]
    count: u32,

    /// Session description stored in the container metadata
    #[arg(long)]
    description: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,
}

const NAMES: [&str; 10] = [
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
];

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .init();

    let types = demo::type_registry()?;

    let metadata = SessionMetadata {
        description: args.description.clone(),
        ..Default::default()
    };
    let mut session = WriterSession::create_with_metadata(&args.output, metadata)?;

    if !args.quiet {
        info!("sdlog-write v{}", env!("CARGO_PKG_VERSION"));
        info!("Output: {}", args.output.display());
    }

    // Students
    let student_schema = session.add_schema(
        Student::type_name(),
        ENCODING,
        build_closure(&types, Student::type_name())?,
    );
    let student_channel = session.add_channel("students", ENCODING, student_schema)?;

    for i in 0..args.count {
        let name = NAMES[i as usize % NAMES.len()];
        let student = Student {
            id: i as i32 + 1,
            name: name.to_string(),
            age: 18 + (i as i32 % 5),
            email: format!("{}@example.com", name),
            score: 75.0 + i as f32 * 2.5,
        };

        let now = now_nanos();
        session.write_message(student_channel, i, now, now, &student)?;
        debug!("Wrote {:?}", student);
    }

    // Points
    let point_schema = session.add_schema(
        Point3::type_name(),
        ENCODING,
        build_closure(&types, Point3::type_name())?,
    );
    let point_channel = session.add_channel("points", ENCODING, point_schema)?;

    for i in 0..args.count {
        let point = Point3 {
            x: i as f64,
            y: (i as f64).sin(),
            z: i as f64 * 0.5,
        };

        let now = now_nanos();
        session.write_message(point_channel, i, now, now, &point)?;
        debug!("Wrote {:?}", point);
    }

    session.finish()?;

    if !args.quiet {
        info!(
            "Wrote {} Student + {} Point3 records to {}",
            args.count,
            args.count,
            args.output.display()
        );
    }

    Ok(())
}
