fn main() {
    #[cfg(feature = "cli")]
    flashpatch::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("flashpatch: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
