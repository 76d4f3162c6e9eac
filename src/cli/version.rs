//! Version command handler

/// Display version information
pub fn display_version() {
    println!("kubegraph {}", env!("CARGO_PKG_VERSION"));
    println!("  {}", env!("CARGO_PKG_DESCRIPTION"));
    println!("  License: {}", env!("CARGO_PKG_LICENSE"));
    if cfg!(feature = "cluster") {
        println!("  Live cluster listing: enabled");
    } else {
        println!("  Live cluster listing: disabled (built without `cluster`)");
    }
}
