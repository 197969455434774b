fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    // Release pipelines can pin the reported revision explicitly
    println!("cargo:rerun-if-env-changed=CHECKMASTER_GIT_HASH");
    if let Ok(hash) = std::env::var("CHECKMASTER_GIT_HASH") {
        println!("cargo:rustc-env=CHECKMASTER_GIT_HASH={}", hash);
    }
}
