// Copyright 2025 extractive_rag_engine contributors
// SPDX-License-Identifier: MIT
//
// Licensed under the MIT License. You may obtain a copy of the License at
// https://opensource.org/licenses/MIT
//
// This software is provided "AS IS", without warranty of any kind, express or
// implied, including but not limited to the warranties of merchantability,
// fitness for a particular purpose, and noninfringement. In no event shall the
// authors or copyright holders be liable for any claim, damages, or other
// liability arising from the use of this software.
//
// CONTRIBUTOR GUIDELINES:
// This file is part of the core engine. Any modifications require owner approval.
// Please submit a PR with detailed explanation of changes before modifying.
//
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::RwLock;
use lazy_static::lazy_static;

lazy_static! {
    static ref LOG_SINK: RwLock<Option<Sender<String>>> = RwLock::new(None);
}

/// Track whether the logger has been initialized to avoid double initialization errors.
static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

use log::{Level, Metadata, Record};

struct CombinedLogger;

impl log::Log for CombinedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        #[cfg(debug_assertions)]
        {
            metadata.level() <= Level::Debug
        }
        #[cfg(not(debug_assertions))]
        {
            metadata.level() <= Level::Info
        }
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let msg = format!("[{}][{}] {}", record.level(), record.target(), record.args());

            // Only fall back to stderr when no sink is listening (avoid duplication)
            if !try_send_log_to_sink(&msg) {
                eprintln!("{}", msg);
            }
        }
    }

    fn flush(&self) {}
}

static LOGGER: CombinedLogger = CombinedLogger;

/// Initialize the global logger.
///
/// This function is idempotent - calling it multiple times is safe and will
/// simply return Ok(()) if the logger is already initialized.
///
/// Log levels:
/// - Debug builds: DEBUG and above
/// - Release builds: INFO and above
pub fn init_logger() -> anyhow::Result<()> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Ok(());
    }

    #[cfg(debug_assertions)]
    let level = log::LevelFilter::Debug;
    #[cfg(not(debug_assertions))]
    let level = log::LevelFilter::Info;

    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .map_err(|e| {
            // Reset the flag if initialization failed
            LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
            anyhow::anyhow!("Logger init failed: {}", e)
        })
}

/// Route formatted log lines to `sink` instead of stderr.
/// Used by hosting applications that surface engine logs in their own UI.
pub fn init_log_sink(sink: Sender<String>) -> anyhow::Result<()> {
    let mut guard = LOG_SINK.write().map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
    *guard = Some(sink);
    Ok(())
}

/// Detach the log sink; subsequent lines go back to stderr.
pub fn close_log_sink() -> anyhow::Result<()> {
    let mut guard = LOG_SINK.write().map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
    *guard = None;
    Ok(())
}

/// Returns true if the line was delivered to a live sink.
fn try_send_log_to_sink(msg: &str) -> bool {
    match LOG_SINK.read() {
        Ok(guard) => match &*guard {
            Some(sink) => sink.send(msg.to_string()).is_ok(),
            None => false,
        },
        Err(_) => {
            #[cfg(debug_assertions)]
            eprintln!("[WARNING] log sink lock is poisoned");
            false
        }
    }
}
