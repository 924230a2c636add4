fn main() {
    // Only firmware images need the ESP-IDF environment; host builds skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
