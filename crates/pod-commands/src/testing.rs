//! Shared fixtures for the crate's unit tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use pod_protocol::{Pod, PodConfig, Request};
use pod_store::InMemoryRowStore;

use crate::context::CommandContext;

/// An output sink whose contents the test can read back.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn context_with(config: PodConfig) -> (CommandContext, Capture) {
    let pod = Pod::new(Arc::new(InMemoryRowStore::new()), config).unwrap();
    let capture = Capture::default();
    let ctx = CommandContext::new(Arc::new(pod)).with_output(Box::new(capture.clone()));
    (ctx, capture)
}

pub fn context() -> (CommandContext, Capture) {
    context_with(PodConfig::default())
}

/// PUT straight through the handler, asserting success.
pub fn write(ctx: &CommandContext, url: &str, body: Option<&str>) {
    let res = ctx
        .pod
        .handle_request(url, &Request::put(body.map(str::to_string)));
    assert_eq!(res.status, 201, "PUT {url}: {:?}", res.body);
}
