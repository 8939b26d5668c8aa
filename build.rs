fn main() {
    // Tell Cargo to rerun this build script if app.rc or app.manifest changes.
    println!("cargo:rerun-if-changed=app.rc");
    println!("cargo:rerun-if-changed=app.manifest");

    // The resource script only matters for the Win32 backend.
    #[cfg(target_os = "windows")]
    {
        let _ = embed_resource::compile("app.rc", &[] as &[&str]);
    }
}
