fn main() {
    vimpack::run_cli();
}
