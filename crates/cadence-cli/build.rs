//! Stamps the binary with its compilation time, formatted the way the device
//! reports it (`Jan 01 2026, 12:00:00`).

fn main() {
    let stamp = chrono::Local::now().format("%b %d %Y, %H:%M:%S");
    println!("cargo:rustc-env=CADENCE_COMPILATION_TIME={stamp}");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src");
}
