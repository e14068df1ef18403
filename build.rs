fn main() {
    // NOTE: update when adding new device support!
    // Host builds (no chip feature) only carry the buffer and bit-bang code.
    #[cfg(feature = "esp32")]
    {
        let target = std::env::var("TARGET").unwrap();
        assert!(
            target == "xtensa-esp32-none-elf",
            "feature esp32 does not match target {}",
            target
        );
        println!("cargo:rustc-link-arg-examples=-Tlinkall.x");
    }
}
