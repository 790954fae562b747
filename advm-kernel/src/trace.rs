use std::env;
use std::fmt;
use std::sync::OnceLock;

/// Trace categories, enabled via environment variables.
///
/// Supported:
/// - ADVM_TRACE="kernel,workaround,signature,selector" (comma/space separated; "all" enables all)
/// - ADVM_TRACE_KERNEL=1, ADVM_TRACE_WORKAROUND=1, ADVM_TRACE_SIGNATURE=1, ADVM_TRACE_SELECTOR=1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceKind {
    Kernel,
    Workaround,
    Signature,
    Selector,
}

const M_KERNEL: u32 = 1 << 0;
const M_WORKAROUND: u32 = 1 << 1;
const M_SIGNATURE: u32 = 1 << 2;
const M_SELECTOR: u32 = 1 << 3;
const M_ALL: u32 = M_KERNEL | M_WORKAROUND | M_SIGNATURE | M_SELECTOR;

fn parse_bool_env(name: &str) -> bool {
    match env::var(name) {
        Ok(v) => {
            let s = v.trim().to_ascii_lowercase();
            !(s.is_empty() || s == "0" || s == "false" || s == "no" || s == "off")
        }
        Err(_) => false,
    }
}

fn parse_mask_from_trace_list(s: &str) -> u32 {
    let mut mask = 0u32;
    for raw in s.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => mask |= M_ALL,
            "kernel" | "k" => mask |= M_KERNEL,
            "workaround" | "wa" => mask |= M_WORKAROUND,
            "signature" | "sig" => mask |= M_SIGNATURE,
            "selector" | "sel" => mask |= M_SELECTOR,
            _ => {}
        }
    }
    mask
}

fn build_mask() -> u32 {
    let mut mask = 0u32;

    if let Ok(list) = env::var("ADVM_TRACE") {
        mask |= parse_mask_from_trace_list(&list);
    }
    if parse_bool_env("ADVM_TRACE_KERNEL") {
        mask |= M_KERNEL;
    }
    if parse_bool_env("ADVM_TRACE_WORKAROUND") {
        mask |= M_WORKAROUND;
    }
    if parse_bool_env("ADVM_TRACE_SIGNATURE") {
        mask |= M_SIGNATURE;
    }
    if parse_bool_env("ADVM_TRACE_SELECTOR") {
        mask |= M_SELECTOR;
    }
    mask
}

fn mask() -> u32 {
    static MASK: OnceLock<u32> = OnceLock::new();
    *MASK.get_or_init(build_mask)
}

pub fn enabled(k: TraceKind) -> bool {
    let bit = match k {
        TraceKind::Kernel => M_KERNEL,
        TraceKind::Workaround => M_WORKAROUND,
        TraceKind::Signature => M_SIGNATURE,
        TraceKind::Selector => M_SELECTOR,
    };
    mask() & bit != 0
}

pub fn kernel(args: fmt::Arguments) {
    if !enabled(TraceKind::Kernel) {
        return;
    }
    log::info!("{}", args);
}

pub fn workaround(args: fmt::Arguments) {
    if !enabled(TraceKind::Workaround) {
        return;
    }
    log::info!("{}", args);
}

pub fn signature(args: fmt::Arguments) {
    if !enabled(TraceKind::Signature) {
        return;
    }
    log::info!("{}", args);
}

pub fn selector(args: fmt::Arguments) {
    if !enabled(TraceKind::Selector) {
        return;
    }
    log::info!("{}", args);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_list() {
        let mask = parse_mask_from_trace_list("kernel, sig");
        assert_eq!(mask, M_KERNEL | M_SIGNATURE);
        assert_eq!(parse_mask_from_trace_list("ALL"), M_ALL);
        assert_eq!(parse_mask_from_trace_list("render;;wa"), M_WORKAROUND);
        assert_eq!(parse_mask_from_trace_list(""), 0);
    }
}
