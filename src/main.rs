fn main() {
    tfmart::app::cli::run();
}
