use std::env;
use std::process::Command;

/// A vector unit of the build host, ordered widest first.
struct VectorUnit {
    cfg_flag: &'static str,
    /// Substring of `/proc/cpuinfo` flags announcing the unit.
    cpuinfo: &'static [&'static str],
    /// `sysctl` key announcing the unit on macOS.
    sysctl: &'static str,
}

const VECTOR_UNITS: &[VectorUnit] = &[
    VectorUnit {
        cfg_flag: "avx512",
        cpuinfo: &["avx512f"],
        sysctl: "hw.optional.avx512f: 1",
    },
    VectorUnit {
        cfg_flag: "avx2",
        cpuinfo: &["avx2"],
        sysctl: "hw.optional.avx2_0: 1",
    },
    VectorUnit {
        cfg_flag: "sse",
        cpuinfo: &["sse4_1"],
        sysctl: "hw.optional.sse4_1: 1",
    },
    VectorUnit {
        // aarch64 kernels report Advanced SIMD as "asimd"
        cfg_flag: "neon",
        cpuinfo: &["neon", "asimd"],
        sysctl: "hw.optional.neon: 1",
    },
];

const FALLBACK_FLAG: &str = "fallback";

/// Lowercased feature listing of the build host, if one can be read.
fn host_feature_listing() -> Option<String> {
    if cfg!(target_os = "linux") {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .map(|s| s.to_lowercase())
    } else if cfg!(target_os = "macos") {
        Command::new("sysctl")
            .arg("-a")
            .output()
            .ok()
            .map(|out| String::from_utf8_lossy(&out.stdout).to_lowercase())
    } else {
        None
    }
}

fn widest_unit(listing: &str) -> Option<&'static VectorUnit> {
    VECTOR_UNITS.iter().find(|unit| {
        if cfg!(target_os = "macos") {
            listing.contains(unit.sysctl)
        } else {
            unit.cpuinfo.iter().any(|flag| listing.contains(flag))
        }
    })
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    for flag in VECTOR_UNITS
        .iter()
        .map(|unit| unit.cfg_flag)
        .chain([FALLBACK_FLAG])
    {
        println!("cargo::rustc-check-cfg=cfg({flag})");
    }

    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();

    // Cross builds never probe the build machine
    let unit = if host == target {
        host_feature_listing().and_then(|listing| widest_unit(&listing))
    } else {
        None
    };

    let cfg_flag = unit.map_or(FALLBACK_FLAG, |unit| unit.cfg_flag);
    println!("cargo:rustc-cfg={cfg_flag}");
}
