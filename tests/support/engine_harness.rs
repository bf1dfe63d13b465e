#![allow(dead_code)]

use std::sync::Arc;

use netmedic::remediation::InterfaceLocks;
use netmedic::runner::FakeCommandRunner;
use netmedic::{Config, Engine};

/// An engine over `fake` with a private lock table, so tests never contend
/// with each other through the process-wide one.
pub fn engine_with(fake: &Arc<FakeCommandRunner>, config: Config) -> Engine {
    Engine::builder()
        .config(config)
        .runner(Arc::clone(fake) as Arc<dyn netmedic::runner::CommandRunner>)
        .locks(Arc::new(InterfaceLocks::new()))
        .build()
        .expect("engine should build from a valid config")
}

pub fn healthy_engine() -> (Arc<FakeCommandRunner>, Engine) {
    let fake = Arc::new(FakeCommandRunner::healthy());
    let engine = engine_with(&fake, Config::default());
    (fake, engine)
}
