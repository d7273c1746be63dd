fn main() {
    kagero::init();
    kagero::uci::run();
}
