fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    lava_lamp_lbm::start();
}
