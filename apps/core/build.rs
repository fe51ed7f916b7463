fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set("ProductName", "EdgeDeflector");
    res.set(
        "FileDescription",
        "Rewrites microsoft-edge: links and opens them in the default browser",
    );

    let icon_path = "../assets/edge-deflector.ico";
    println!("cargo:rerun-if-changed={icon_path}");
    if std::path::Path::new(icon_path).exists() {
        res.set_icon(icon_path);
    } else {
        println!(
            "cargo:warning=edge-deflector-core: Windows icon missing at {icon_path}; continuing without embedded icon"
        );
    }

    res.compile().expect("failed to compile Windows resources");
}
