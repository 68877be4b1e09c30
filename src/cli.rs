// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::check::check_files;
use crate::cmd::import::import_files;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;
use crate::web::server::DEFAULT_PORT;
use crate::web::server::start_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Serve the practice web UI.
    Serve {
        /// Optional path to the content directory.
        directory: Option<String>,
        /// Port to listen on.
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Import JSON set files into a directory's database.
    Import {
        /// Path to the content directory.
        directory: PathBuf,
        /// Files or directories to import.
        paths: Vec<PathBuf>,
    },
    /// Validate JSON set files without importing them.
    Check {
        /// Files or directories to check.
        paths: Vec<PathBuf>,
    },
    /// Print set and item counts per category.
    Stats {
        /// Optional path to the content directory.
        directory: Option<String>,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve { directory, port } => {
            let directory = resolve_directory(directory)?;
            println!("Serving {directory:?} on port {port}.");
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(start_server(directory, port))
        }
        Command::Import { directory, paths } => import_files(&directory, &paths),
        Command::Check { paths } => check_files(&paths),
        Command::Stats { directory, format } => {
            let directory = resolve_directory(directory)?;
            print_stats(&directory, format)
        }
    }
}

fn resolve_directory(directory: Option<String>) -> Fallible<PathBuf> {
    match directory {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(std::env::current_dir()?),
    }
}
