//! Smoke-test plugin loaded by the workspace integration tests.
//!
//! Built as a real cdylib. It answers:
//!
//! - `"ping"` with `"pong"`, forwarding the payload untouched
//! - `"shout"` (expects a `String`) with `"shout-reply"`, uppercased
//!
//! On unload it emits `"unloaded"` carrying the number of pings served, so
//! tests can observe that the unload notification fires while host
//! callbacks are still registered.

use gantry_sdk::prelude::*;

pub struct ExamplePlugin {
    bridge: BridgeHandle,
    pings: u64,
}

impl ExamplePlugin {
    pub fn new(bridge: BridgeHandle) -> Self {
        Self { bridge, pings: 0 }
    }
}

#[async_trait]
impl Plugin for ExamplePlugin {
    fn name(&self) -> &str {
        "ExamplePlugin"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn author(&self) -> &str {
        "John Doe"
    }

    fn on_unload(&mut self) {
        self.bridge.send("unloaded", &self.pings);
    }

    async fn on_event(&mut self, event: &str, data: &EventData) {
        match event {
            "ping" => {
                self.pings += 1;
                self.bridge.send("pong", data);
            }
            "shout" => {
                if let Some(msg) = data.downcast_ref::<String>() {
                    let reply = msg.to_uppercase();
                    self.bridge.send("shout-reply", &reply);
                }
            }
            _ => {}
        }
    }
}

export_plugin!(BasicPluginBuilder::new(|bridge| {
    Box::new(ExamplePlugin::new(bridge))
}));

/// Alternate entry point exercised by the configurable-symbol tests; also
/// the macro-free spelling of the contract.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn createPluginAlt() -> *mut std::ffi::c_void {
    let builder: Box<dyn PluginBuilder> =
        Box::new(BasicPluginBuilder::new(|bridge| {
            Box::new(ExamplePlugin::new(bridge))
        }));
    Box::into_raw(Box::new(builder)).cast()
}
