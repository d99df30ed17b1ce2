//! Logger module
//!
//! Provides logging utilities for the front end including:
//! - Server lifecycle logging
//! - Access logging in combined, common or JSON format
//! - Backend call tracing at `debug` level
//! - Error and warning logging, optionally to files

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Local;

use crate::config::Config;

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    DEBUG_ENABLED.store(
        config.logging.level.eq_ignore_ascii_case("debug"),
        Ordering::Relaxed,
    );
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Write to info/access log
fn write_info(message: &str) {
    let line = format!("{} {message}", timestamp());
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    let line = format!("{} {message}", timestamp());
    match writer::get() {
        Some(w) => w.write_error(&line),
        None => eprintln!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("[INFO] ======================================");
    write_info("[INFO] Quiz front end started");
    write_info(&format!("[INFO] Listening on: http://{addr}"));
    write_info(&format!("[INFO] Backend: {}", config.backend.base_url));
    write_info(&format!(
        "[INFO] Backend timeout: {}s",
        config.backend.timeout
    ));
    write_info(&format!("[INFO] Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("[INFO] Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("[INFO] Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("[INFO] Error log: {path}"));
    }
    write_info("[INFO] ======================================");
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    if DEBUG_ENABLED.load(Ordering::Relaxed) {
        write_info(&format!("[DEBUG] Connection accepted from: {peer_addr}"));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log one finished backend exchange (debug level only)
pub fn log_backend_call(method: &str, path: &str, outcome: &str, started: Instant) {
    if DEBUG_ENABLED.load(Ordering::Relaxed) {
        write_info(&format!(
            "[BACKEND] {method} {path} -> {outcome} ({} ms)",
            started.elapsed().as_millis()
        ));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown(reason: &str) {
    write_info(&format!("[INFO] Shutting down: {reason}"));
}
