/*
 * Cobweb
 *
 * A procedurally grown cobweb: slack threads strung across the window corners,
 * later threads hung between existing ones, and faint cross strands joining
 * whatever ends up close together. Threads sag under gravity and can be
 * dragged with the mouse.
 *
 * Set RUST_LOG to change the log level (default: info).
 */

use cobweb::app;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    nannou::app(app::model)
        .update(app::update)
        .run();
}
