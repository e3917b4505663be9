//! Kubernetes resource quantity parsing.
//!
//! Converts CPU and memory quantities from their string form into exact
//! decimal core and GiB values, so cost math never goes through floats.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

// ============================================================================
// CPU Parsing
// ============================================================================

/// Regex for CPU values (e.g., "100m", "1", "1.5", "0.1")
static CPU_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(m)?$").unwrap());

/// Parse a CPU quantity to cores.
///
/// # Examples
/// - "100m" -> 0.1
/// - "2" -> 2
/// - "1.5" -> 1.5
pub fn parse_cpu_cores(cpu: &str) -> Option<Decimal> {
    let caps = CPU_REGEX.captures(cpu.trim())?;
    let value = Decimal::from_str(caps.get(1)?.as_str()).ok()?;
    if caps.get(2).is_some() {
        Some(value / Decimal::from(1000))
    } else {
        Some(value)
    }
}

// ============================================================================
// Memory Parsing
// ============================================================================

/// Regex for memory values (e.g., "128Mi", "1Gi", "512M", "1073741824")
static MEMORY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(Ki|Mi|Gi|Ti|K|M|G|T)?$").unwrap());

const GIB: i64 = 1024 * 1024 * 1024;

/// Parse a memory quantity to bytes, keeping fractional values exact.
pub fn parse_memory_bytes(memory: &str) -> Option<Decimal> {
    let caps = MEMORY_REGEX.captures(memory.trim())?;
    let value = Decimal::from_str(caps.get(1)?.as_str()).ok()?;

    let multiplier: i64 = match caps.get(2).map(|m| m.as_str()) {
        Some("Ki") => 1024,
        Some("Mi") => 1024 * 1024,
        Some("Gi") => GIB,
        Some("Ti") => GIB * 1024,
        Some("K") => 1_000,
        Some("M") => 1_000_000,
        Some("G") => 1_000_000_000,
        Some("T") => 1_000_000_000_000,
        _ => 1,
    };

    value.checked_mul(Decimal::from(multiplier))
}

/// Parse a memory quantity to GiB.
///
/// # Examples
/// - "4Gi" -> 4
/// - "512Mi" -> 0.5
/// - "1073741824" -> 1
pub fn parse_memory_gib(memory: &str) -> Option<Decimal> {
    parse_memory_bytes(memory).map(|bytes| bytes / Decimal::from(GIB))
}

/// Parse a storage quantity (same grammar as memory) to GiB.
pub fn parse_storage_gib(storage: &str) -> Option<Decimal> {
    parse_memory_gib(storage)
}
