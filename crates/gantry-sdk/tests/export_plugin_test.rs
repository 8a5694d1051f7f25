//! Entry point contract tests: the exported symbol constructs a builder on
//! the heap and hands sole ownership to the caller.

use std::sync::{Arc, Mutex};

use gantry_sdk::prelude::*;

struct EchoPlugin {
    bridge: BridgeHandle,
}

#[async_trait]
impl Plugin for EchoPlugin {
    fn name(&self) -> &str {
        "EchoPlugin"
    }

    fn version(&self) -> &str {
        "0.9.1"
    }

    fn author(&self) -> &str {
        "SDK Tests"
    }

    async fn on_event(&mut self, event: &str, data: &EventData) {
        if event == "echo" {
            self.bridge.send("echo-reply", data);
        }
    }
}

export_plugin!(BasicPluginBuilder::new(|bridge| Box::new(EchoPlugin { bridge })));

fn reconstitute() -> Box<dyn PluginBuilder> {
    let raw = createPlugin();
    assert!(!raw.is_null());
    // SAFETY: this is the host side of the entry point contract; the
    // pointer is non-null and ownership transfers exactly once.
    unsafe { *Box::from_raw(raw.cast::<Box<dyn PluginBuilder>>()) }
}

#[test]
fn test_entry_point_transfers_builder_ownership() {
    let mut builder = reconstitute();
    builder.build();

    let instance = builder.core().instance().expect("instance stored");
    assert_eq!(instance.name(), "EchoPlugin");
    assert_eq!(instance.version(), "0.9.1");
    assert_eq!(instance.author(), "SDK Tests");
}

#[test]
fn test_each_invocation_yields_a_fresh_builder() {
    let mut first = reconstitute();
    let mut second = reconstitute();
    first.build();
    second.build();
    assert!(first.core().is_active());
    assert!(second.core().is_active());
}

#[tokio::test]
async fn test_round_trip_through_exported_builder() {
    let mut builder = reconstitute();
    builder.build();

    let replies: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = replies.clone();
    builder.core().registrar().register("echo-reply", move |data| {
        if let Some(msg) = data.downcast_ref::<String>() {
            sink.lock().unwrap().push(msg.clone());
        }
    });

    let payload = String::from("testing");
    builder.core_mut().receive("echo", &payload).await;

    assert_eq!(*replies.lock().unwrap(), ["testing"]);
}
