fn main() {
    shmup_pools::game::run();
}
