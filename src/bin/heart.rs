use gfx_first_app::Demo;

fn main() {
    env_logger::init();
    gfx_first_app::run(Demo::heart());
}
