// Copyright 2026 The Node Developers
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

//! Logging wrapper to be used throughout the workspace. Every crate logs
//! through the `log` facade; this module is the one place that decides
//! where those records go. Before `init_logger`/`init_test_logger` runs,
//! records are simply dropped by the default `log` no-op logger.

use std::panic;
use std::thread;

use backtrace::Backtrace;
use log::{LevelFilter, Record};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::append::Append;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::{threshold::ThresholdFilter, Filter, Response};
use parking_lot::Mutex;

use crate::types::{LogLevel, LoggingConfig};

fn convert_log_level(level: LogLevel) -> LevelFilter {
	match level {
		LogLevel::Error => LevelFilter::Error,
		LogLevel::Warning => LevelFilter::Warn,
		LogLevel::Info => LevelFilter::Info,
		LogLevel::Debug => LevelFilter::Debug,
		LogLevel::Trace => LevelFilter::Trace,
	}
}

lazy_static::lazy_static! {
	/// Whether logging was explicitly initialised.
	static ref WAS_INIT: Mutex<bool> = Mutex::new(false);
}

const LOGGING_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {M} - {m}{n}";

/// Rejects records that don't originate in this workspace, so embedding
/// applications that also use `log` don't get their own noise mixed in
/// when they opt into this logger wholesale.
#[derive(Debug)]
struct WorkspaceFilter;

impl Filter for WorkspaceFilter {
	fn filter(&self, record: &Record<'_>) -> Response {
		match record.module_path() {
			Some(path) if path.starts_with("bcnode") => Response::Neutral,
			_ => Response::Reject,
		}
	}
}

/// Initializes the process-wide logger from the given configuration.
/// A second call is a no-op (mirrors log4rs's own "init once" contract).
pub fn init_logger(config: &LoggingConfig) {
	let mut was_init = WAS_INIT.lock();
	if *was_init {
		return;
	}

	let level_stdout = convert_log_level(config.stdout_log_level);
	let level_file = convert_log_level(config.file_log_level);
	let level_minimum = level_stdout.max(level_file);

	let mut root = Root::builder();
	let mut appenders = Vec::new();

	if config.log_to_stdout {
		let stdout = ConsoleAppender::builder()
			.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
			.build();
		appenders.push(
			Appender::builder()
				.filter(Box::new(ThresholdFilter::new(level_stdout)))
				.filter(Box::new(WorkspaceFilter))
				.build("stdout", Box::new(stdout)),
		);
		root = root.appender("stdout");
	}

	if config.log_to_file {
		let file: Box<dyn Append> = Box::new(
			FileAppender::builder()
				.append(config.log_file_append)
				.encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
				.build(&config.log_file_path)
				.expect("failed to open log file"),
		);
		appenders.push(
			Appender::builder()
				.filter(Box::new(ThresholdFilter::new(level_file)))
				.filter(Box::new(WorkspaceFilter))
				.build("file", file),
		);
		root = root.appender("file");
	}

	let built = Config::builder()
		.appenders(appenders)
		.build(root.build(level_minimum))
		.expect("invalid logging configuration");

	log4rs::init_config(built).expect("logger already initialized by another handle");

	install_panic_hook();
	*was_init = true;

	log::info!(
		"logger initialized: stdout={:?} file={:?} minimum={:?}",
		level_stdout,
		level_file,
		level_minimum
	);
}

/// Initializes a stdout-only, debug-level logger, meant for `#[test]` bodies.
pub fn init_test_logger() {
	let mut config = LoggingConfig::default();
	config.log_to_file = false;
	config.stdout_log_level = LogLevel::Debug;
	init_logger(&config);
}

fn install_panic_hook() {
	panic::set_hook(Box::new(|info| {
		let backtrace = Backtrace::new();
		let thread = thread::current();
		let thread_name = thread.name().unwrap_or("unnamed");
		let msg = info
			.payload()
			.downcast_ref::<&str>()
			.copied()
			.or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
			.unwrap_or("Box<dyn Any>");

		match info.location() {
			Some(location) => log::error!(
				"thread '{}' panicked at '{}': {}:{}\n{:?}",
				thread_name,
				msg,
				location.file(),
				location.line(),
				backtrace
			),
			None => log::error!("thread '{}' panicked at '{}'\n{:?}", thread_name, msg, backtrace),
		}
	}));
}
