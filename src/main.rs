fn main() {
    dirserve::run();
}
