fn main() {
    println!("cargo:rerun-if-changed=src/bindings.h");
    println!("cargo:rerun-if-env-changed=WASTESORT_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WASTESORT_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=WASTESORT_API_KEY");
    println!("cargo:rerun-if-env-changed=WASTESORT_CONFIG_JSON");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
